//! Material texture channels.
//!
//! A PBR material has six texture slots. [`Channels`] stores one optional value
//! per slot and is generic so the same bookkeeping serves GPU textures, image
//! URLs from a texture descriptor, or plain values in tests.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialChannel {
    Color,
    Normal,
    Roughness,
    Metalness,
    AmbientOcclusion,
    Emissive,
}

impl MaterialChannel {
    pub const ALL: [MaterialChannel; 6] = [
        MaterialChannel::Color,
        MaterialChannel::Normal,
        MaterialChannel::Roughness,
        MaterialChannel::Metalness,
        MaterialChannel::AmbientOcclusion,
        MaterialChannel::Emissive,
    ];

    /// The key used for this channel in texture descriptor documents.
    pub fn key(self) -> &'static str {
        match self {
            MaterialChannel::Color => "map",
            MaterialChannel::Normal => "normalMap",
            MaterialChannel::Roughness => "roughnessMap",
            MaterialChannel::Metalness => "metalnessMap",
            MaterialChannel::AmbientOcclusion => "aoMap",
            MaterialChannel::Emissive => "emissiveMap",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.key() == key)
    }

    /// Colour data is stored gamma encoded, everything else is linear.
    pub fn is_color(self) -> bool {
        matches!(self, MaterialChannel::Color | MaterialChannel::Emissive)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MaterialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Channels<T> {
    slots: [Option<T>; 6],
}

impl<T> Channels<T> {
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None, None, None],
        }
    }

    pub fn get(&self, channel: MaterialChannel) -> Option<&T> {
        self.slots[channel.index()].as_ref()
    }

    /// Returns the previous value of the slot.
    pub fn set(&mut self, channel: MaterialChannel, value: T) -> Option<T> {
        self.slots[channel.index()].replace(value)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Occupied slots in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialChannel, &T)> {
        MaterialChannel::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(channel, slot)| slot.as_ref().map(|value| (channel, value)))
    }
}

impl<T: Clone> Channels<T> {
    /// Copy every occupied slot of `other` over `self`.
    ///
    /// Slots that are empty in `other` keep their current value. Returns the
    /// channels that were written.
    pub fn overlay(&mut self, other: &Channels<T>) -> Vec<MaterialChannel> {
        other
            .iter()
            .map(|(channel, value)| {
                self.set(channel, value.clone());
                channel
            })
            .collect()
    }
}

impl<T> Default for Channels<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(MaterialChannel, T)> for Channels<T> {
    fn from_iter<I: IntoIterator<Item = (MaterialChannel, T)>>(iter: I) -> Self {
        let mut channels = Channels::new();
        for (channel, value) in iter {
            channels.set(channel, value);
        }
        channels
    }
}
