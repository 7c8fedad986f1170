//! Key-value persistence of the daily color decision

use crc::{Crc, CRC_32_ISCSI};
use defmt_or_log as log;
use heapless::{FnvIndexMap, Vec};
use serde::{Deserialize, Serialize};

use crate::picker::{ColorChoice, DayOfWeek, PersistedState};

/// Key of the last chosen color index
pub const COLOR_KEY: u32 = 8;
/// Key of the day of week the color was chosen on
pub const DAY_KEY: u32 = 7;

/// Integer key-value store that survives restarts
pub trait KeyValueStore {
    type Error;

    /// Read a value, `None` if the key was never written or was deleted
    fn read_int(&mut self, key: u32) -> Result<Option<i32>, Self::Error>;

    fn write_int(&mut self, key: u32, value: i32) -> Result<(), Self::Error>;

    /// Remove a key. Removing a missing key is not an error.
    fn delete(&mut self, key: u32) -> Result<(), Self::Error>;

    /// Commit buffered changes to the backing medium
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl PersistedState {
    /// Read the previous decision. Missing or out of range values mean there
    /// is nothing to carry over.
    pub fn load<S: KeyValueStore>(store: &mut S) -> Result<Option<Self>, S::Error> {
        let (Some(color), Some(day)) = (store.read_int(COLOR_KEY)?, store.read_int(DAY_KEY)?)
        else {
            log::info!("No stored color");
            return Ok(None);
        };

        let color = u8::try_from(color).ok().and_then(ColorChoice::new);
        let day = u8::try_from(day).ok().and_then(DayOfWeek::new);
        match (color, day) {
            (Some(color), Some(day)) => Ok(Some(Self { color, day })),
            _ => {
                log::warn!("Ignoring out of range stored color");
                Ok(None)
            }
        }
    }

    /// Replace the stored decision with this one
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<(), S::Error> {
        store.delete(COLOR_KEY)?;
        store.delete(DAY_KEY)?;
        store.write_int(COLOR_KEY, self.color.index() as i32)?;
        store.write_int(DAY_KEY, self.day.number() as i32)?;
        store.flush()
    }
}

/// Number of keys a [`MemoryStore`] holds
pub const STORE_CAPACITY: usize = 8;

/// Largest encoded table: a length byte, up to five bytes per varint key and
/// value, and the CRC-32
pub const IMAGE_CAPACITY: usize = 1 + STORE_CAPACITY * 10 + 4;

/// Encoded key-value table as laid out in flash
pub type SectorImage = Vec<u8, IMAGE_CAPACITY>;

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryStoreError {
    /// No room for another key
    Full,
    /// The table did not fit the image buffer
    Serialization,
}

/// Fixed-capacity store kept in RAM
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    entries: FnvIndexMap<u32, i32, STORE_CAPACITY>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the table with postcard, followed by its CRC-32
    pub fn encode(&self) -> Result<SectorImage, MemoryStoreError> {
        let mut buffer = [0u8; IMAGE_CAPACITY];

        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let used = postcard::to_slice_crc32(self, &mut buffer, crc.digest())
            .map_err(|_| MemoryStoreError::Serialization)?;

        SectorImage::from_slice(used).map_err(|_| MemoryStoreError::Serialization)
    }

    /// Decode a table written by [`MemoryStore::encode`]. Trailing bytes are
    /// ignored. Erased or damaged data decodes to an empty store.
    pub fn decode(bytes: &[u8]) -> Self {
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        match postcard::from_bytes_crc32::<Self>(bytes, crc.digest()) {
            Ok(store) => store,
            Err(_) => {
                log::info!("No valid stored table");
                Self::new()
            }
        }
    }
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn read_int(&mut self, key: u32) -> Result<Option<i32>, Self::Error> {
        Ok(self.entries.get(&key).copied())
    }

    fn write_int(&mut self, key: u32, value: i32) -> Result<(), Self::Error> {
        self.entries
            .insert(key, value)
            .map(|_| ())
            .map_err(|_| MemoryStoreError::Full)
    }

    fn delete(&mut self, key: u32) -> Result<(), Self::Error> {
        self.entries.remove(&key);
        Ok(())
    }
}

/// Storage medium holding one encoded table
pub trait SectorBackend {
    type Error;

    /// Fill `buf` from the start of the sector
    fn read_sector(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Replace the sector contents with `image`
    fn write_sector(&mut self, image: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SectorStoreError<E> {
    Backend(E),
    Store(MemoryStoreError),
}

impl<E> From<MemoryStoreError> for SectorStoreError<E> {
    fn from(error: MemoryStoreError) -> Self {
        Self::Store(error)
    }
}

/// Key-value store over a [`SectorBackend`].
///
/// The table is read once on open. Changes stay in RAM until
/// [`KeyValueStore::flush`], which rewrites the sector only when the table
/// differs from what was last written.
pub struct SectorStore<B> {
    backend: B,
    cache: MemoryStore,
    committed: MemoryStore,
}

impl<B: SectorBackend> SectorStore<B> {
    pub fn open(mut backend: B) -> Result<Self, SectorStoreError<B::Error>> {
        let mut image = [0u8; IMAGE_CAPACITY];
        backend
            .read_sector(&mut image)
            .map_err(SectorStoreError::Backend)?;

        let cache = MemoryStore::decode(&image);
        log::info!("Loaded {} stored keys", cache.len());
        Ok(Self {
            backend,
            committed: cache.clone(),
            cache,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SectorBackend> KeyValueStore for SectorStore<B> {
    type Error = SectorStoreError<B::Error>;

    fn read_int(&mut self, key: u32) -> Result<Option<i32>, Self::Error> {
        Ok(self.cache.read_int(key)?)
    }

    fn write_int(&mut self, key: u32, value: i32) -> Result<(), Self::Error> {
        Ok(self.cache.write_int(key, value)?)
    }

    fn delete(&mut self, key: u32) -> Result<(), Self::Error> {
        Ok(self.cache.delete(key)?)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.cache == self.committed {
            log::debug!("Stored table unchanged");
            return Ok(());
        }
        let image = self.cache.encode()?;
        self.backend
            .write_sector(&image)
            .map_err(SectorStoreError::Backend)?;
        self.committed = self.cache.clone();
        log::debug!("Stored {} keys", self.cache.len());
        Ok(())
    }
}
