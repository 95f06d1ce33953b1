pub mod tab_backend;
