pub mod cookie_backend;
