//! Basal delivery normalization.
//!
//! Modules include:
//! - `join`: scheduled rate changes are boundary events; consecutive pairs are
//!   joined into rate segments
//! - `temp`: temporary basals carry their own duration and map 1:1 to segments
//! - `normalize`: the self-join followed by the temp mapping
/// Scheduled rate-change join handler and its builder.
pub mod join;
/// Composition of the join and the temp mapping.
pub mod normalize;
/// Temporary basal mapping.
pub mod temp;

pub use join::{BasalBuilder, BasalJoinHandler, basal_builders, is_scheduled_basal};
pub use normalize::{Normalize, normalize, normalize_stream};
pub use temp::map_temp_basal;
