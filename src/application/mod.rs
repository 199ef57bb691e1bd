pub mod lookup_service;
