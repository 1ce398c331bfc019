// Auth test module
#[cfg(test)]
mod repository_tests;
