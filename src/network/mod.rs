pub mod routes;
pub mod tcp;
