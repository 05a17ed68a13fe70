// Module declarations for all test files in the identity directory
mod cache;
