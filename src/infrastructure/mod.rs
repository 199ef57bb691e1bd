pub mod returns_client;
