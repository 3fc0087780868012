pub mod authenticate;
pub mod bearer;
pub mod paths;
