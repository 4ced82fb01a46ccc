mod catalog_tests;
mod chat_tests;
