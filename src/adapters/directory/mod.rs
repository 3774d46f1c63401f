mod in_memory;

pub use in_memory::{sample_record, InMemoryPatientDirectory};
