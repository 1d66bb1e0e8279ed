use uuid::Uuid;

/// Allocates the anonymized identity of an output file.
pub trait OutputNamer: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUID in simple (undashed) form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidNamer;

impl OutputNamer for UuidNamer {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
