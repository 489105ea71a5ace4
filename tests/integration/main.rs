mod api_tests;
mod service_tests;
