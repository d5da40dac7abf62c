pub mod local_logo_storage;
