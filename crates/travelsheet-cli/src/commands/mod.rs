pub mod boot;
pub mod edit;
pub mod form;
pub mod view;
