pub mod check_access;
pub mod generate_token;
