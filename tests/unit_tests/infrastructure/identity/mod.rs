mod firebase_identity_provider_test;
mod in_memory_identity_provider_test;
