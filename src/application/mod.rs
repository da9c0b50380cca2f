pub mod commerce_service;
