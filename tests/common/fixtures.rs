//! Test fixtures - reusable asset contents.

/// A small vocabulary file
pub const VOCAB_V0: &str = "hello\nworld\n";

/// The vocabulary after an update
pub const VOCAB_V1: &str = "hello\nworld\nassets\n";

/// The vocabulary after a major bump
pub const VOCAB_V2: &str = "bonjour\nmonde\n";

/// Files of a directory asset, relative path and contents
pub const CORPUS_FILES: &[(&str, &str)] = &[
    ("part-1.txt", "first part\n"),
    ("nested/part-2.txt", "second part\n"),
    ("nested/deeper/part-3.txt", "third part\n"),
];
