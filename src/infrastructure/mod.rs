pub mod scratch_store;

pub use scratch_store::ScratchStore;
