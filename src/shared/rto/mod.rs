pub mod created_rto;
pub mod status_rto;
