// Library test module
#[cfg(test)]
mod metadata_tests;
