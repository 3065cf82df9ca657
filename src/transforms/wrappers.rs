// src/transforms/wrappers.rs
//! Call-site wrapper synthesis.
//!
//! Lowers the language's call conventions to what a C-level calling
//! convention supports directly:
//!
//! - defaults: supply a value for every formal the call site omitted
//!   (C has no default arguments);
//! - reorder: put named actuals in formal order
//!   (C has no named argument passing);
//! - coercion: insert the explicit casts, reads, and dereferences the
//!   language implies (C has no base-class or sync coercions);
//! - promotion: replace implicit collection traversals with explicit
//!   iterators (C has no scalar operator promotion).
//!
//! The first and last transformations synthesize a new function that calls
//! the one it wraps; two process-wide caches deduplicate those wrappers
//! across call sites.

mod caches;
mod coerce;
mod defaults;
mod factory;
mod fast_follower;
mod promote;
mod reorder;

pub use caches::WrapperCaches;

use rustc_hash::FxHashMap;

use crate::errors::ResolveError;
use crate::ir::{FnId, Program, SymId};
use crate::sema::{Builtins, CallInfo, Resolution};

/// Compile-time bindings for instantiated param formals, established by
/// overload resolution.
pub type ParamMap = FxHashMap<SymId, SymId>;

/// Pass options threaded from the driver.
#[derive(Debug, Clone, Copy)]
pub struct WrapConfig {
    /// Emit a notification for every promoted call site.
    pub report_promotion: bool,
    /// Globally enable fast-follower check synthesis.
    pub fast_follower_checks: bool,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            report_promotion: false,
            fast_follower_checks: true,
        }
    }
}

/// Everything the pass mutates or consults, bundled so stages take one
/// argument. The caches and param map are process-wide state owned by the
/// driver and injected here to keep tests deterministic.
pub struct WrapEnv<'a> {
    pub program: &'a mut Program,
    pub resolution: &'a mut dyn Resolution,
    pub caches: &'a mut WrapperCaches,
    pub param_map: &'a mut ParamMap,
    pub builtins: &'a Builtins,
    pub config: WrapConfig,
}

/// Rewrite one resolved call site. `actual_formals` pairs each actual (by
/// call position) with the formal it was resolved against; the defaults
/// stage rewrites its entries to the wrapper's formals for reorder to use.
///
/// Returns the function the call should ultimately target: the original, or
/// the outermost synthesized wrapper.
pub fn wrap_and_cleanup_actuals(
    env: &mut WrapEnv,
    fn_: FnId,
    info: &mut CallInfo,
    actual_formals: &mut Vec<SymId>,
    build_fast_follower_checks: bool,
) -> Result<FnId, ResolveError> {
    let num_actuals = actual_formals.len();
    let mut retval = fn_;

    if num_actuals < env.program.func(retval).formals.len() {
        retval = defaults::wrap_defaulted_formals(env, retval, info, actual_formals)?;
    }

    // Map actuals to formals by position
    if actual_formals.len() > 1 {
        reorder::reorder_actuals(env.program, retval, info, actual_formals);
    }

    if !info.actuals.is_empty() {
        coerce::coerce_actuals(env, retval, info)?;
    }

    if promote::is_promotion_required(env, retval, info) {
        retval = promote::promotion_wrap(env, retval, info, build_fast_follower_checks)?;
    }

    // The call is positional from here on; name labels survive only in the
    // CallInfo mirror.
    for actual in &mut env.program.call_mut(info.call).actuals {
        actual.name = None;
    }

    Ok(retval)
}
