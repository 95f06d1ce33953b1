pub mod url_component;
