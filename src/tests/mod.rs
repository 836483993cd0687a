// Test modules for cgnat-check
// Each module contains unit tests for the corresponding source file

mod config_tests;
mod lib_tests;
