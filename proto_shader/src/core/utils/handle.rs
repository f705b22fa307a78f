use std::fmt::Debug;

use num::{Integer, One, Zero};

/// Handles for resources like shaders, programs and surfaces.
/// We use a concrete type to ensure that resource handles are always of the
/// same type no matter the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenericHandle<IndexType, GenType>
where
    IndexType: Integer,
    GenType: Integer + Zero,
{
    pub(super) index: IndexType,
    pub(super) generation: GenType,
}

pub type Handle = GenericHandle<u32, u32>;

pub trait IsHandle: Clone + Copy + Debug + PartialEq {
    type Index: Integer + TryInto<usize> + TryFrom<usize> + Clone + Copy + Debug;
    type Generation: Integer + Zero + One + Clone + Copy + Debug;
    fn index(&self) -> Self::Index;
    fn generation(&self) -> Self::Generation;
    fn new(index: Self::Index, generation: Self::Generation) -> Self;

    /// Position of this handle in the backing array, if it fits in an `usize`
    fn array_index(&self) -> Option<usize> {
        self.index().try_into().ok()
    }
}

impl<IndexType, GenType> IsHandle for GenericHandle<IndexType, GenType>
where
    IndexType: Integer + TryInto<usize> + TryFrom<usize> + Clone + Copy + Debug,
    GenType: Integer + Clone + Copy + Debug,
{
    type Generation = GenType;
    type Index = IndexType;

    fn new(index: Self::Index, generation: Self::Generation) -> Self {
        GenericHandle { index, generation }
    }

    fn generation(&self) -> Self::Generation {
        self.generation
    }

    fn index(&self) -> Self::Index {
        self.index
    }
}

/// Use this allocator in most cases. If you really need
/// one with a specific type of handle, you can use [GenerationalIndexAllocator] with
/// your specific type of Handle
pub type Allocator<V> = GenerationalIndexAllocator<Handle, V>;

/// Slot storage where every slot remembers how many times it was freed.
///
/// A handle is only live while its generation matches the slot's generation, so
/// a handle kept around after `free` can never reach the value that later reuses
/// the same slot.
pub struct GenerationalIndexAllocator<K: IsHandle, V> {
    free: Vec<usize>,
    entries: Vec<AllocatorEntry<V, K::Generation>>,
}

struct AllocatorEntry<V, G> {
    value: Option<V>,
    generation: G,
}

impl<K: IsHandle, V> Default for GenerationalIndexAllocator<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IsHandle, V> GenerationalIndexAllocator<K, V> {
    const INITIAL_SIZE: usize = 16;

    pub fn new() -> Self {
        GenerationalIndexAllocator {
            free: Vec::new(),
            entries: Vec::with_capacity(Self::INITIAL_SIZE),
        }
    }

    pub fn allocate(&mut self, value: V) -> K {
        if let Some(next_index) = self.free.pop() {
            let entry = &mut self.entries[next_index];
            entry.value = Some(value);
            return K::new(Self::to_index(next_index), entry.generation);
        }

        // No free slot to recycle, grow
        let next_index = self.entries.len();
        self.entries.push(AllocatorEntry {
            value: Some(value),
            generation: K::Generation::zero(),
        });
        K::new(Self::to_index(next_index), K::Generation::zero())
    }

    #[inline(always)]
    pub fn is_live(&self, key: K) -> bool {
        self.entry(key).is_some()
    }

    /// Releases the slot and returns its value. Returns `None` when the
    /// handle was already freed or never came from this allocator.
    pub fn free(&mut self, key: K) -> Option<V> {
        let index = key.array_index()?;
        let entry = self.entries.get_mut(index)?;
        if entry.generation != key.generation() {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation + K::Generation::one();

        // Add to the free stack again
        self.free.push(index);
        Some(value)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.entry(key)?.value.as_ref()
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let index = key.array_index()?;
        let entry = self.entries.get_mut(index)?;
        if entry.generation != key.generation() {
            return None;
        }
        entry.value.as_mut()
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, key: K) -> Option<&AllocatorEntry<V, K::Generation>> {
        let entry = self.entries.get(key.array_index()?)?;
        (entry.generation == key.generation() && entry.value.is_some()).then_some(entry)
    }

    fn to_index(index: usize) -> K::Index {
        K::Index::try_from(index)
            .unwrap_or_else(|_| panic!("Handle index {index} does not fit the handle type"))
    }
}
