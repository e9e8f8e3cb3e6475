//! Integration test harness

mod crawl_tests;
