use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Which halves of a project are bound to a live service.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct BindingState: u8 {
        const CONNECTOR = 1 << 0;
        const EXPORTER = 1 << 1;

        const COMPLETE = Self::CONNECTOR.bits() | Self::EXPORTER.bits();
    }
}

impl BindingState {
    #[must_use]
    pub const fn is_complete(self) -> bool {
        self.contains(Self::COMPLETE)
    }
}

impl Serialize for BindingState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for BindingState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
