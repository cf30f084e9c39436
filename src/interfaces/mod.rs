pub mod csv {
    pub mod seed_reader;
}

pub mod stream {
    pub mod delivery_reader;
    pub mod json_publisher;
}
