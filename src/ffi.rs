//! C ABI over [`Session`].
//!
//! Hosts create a session with [`mokp_session_new`], drive it with the
//! `mokp_*` functions and release it with [`mokp_session_free`]. Fallible
//! functions return a status code (`MOKP_OK` or one of the negative
//! `MOKP_ERR_*` values) and leave a message for [`mokp_get_last_error`].
//!
//! Passing a null session pointer, or a null pointer where a buffer is
//! required, panics.
//!
//! Matrices are row-major: `weights[o * num_items + i]` is the weight of
//! item `i` on constraint `o`. Selections are byte arrays where any non-zero
//! byte means "selected".

use crate::engine::{Parameters, Session};
use crate::error::{MokpError, Result};
use crate::persist;
use crate::solution::Solution;
use std::ffi::{c_char, CStr, CString};

/// Success.
pub const MOKP_OK: i32 = 0;
/// [`MokpError::InvalidParameter`].
pub const MOKP_ERR_INVALID_PARAMETER: i32 = -1;
/// [`MokpError::Io`].
pub const MOKP_ERR_IO: i32 = -2;
/// [`MokpError::ResourceExhaustion`].
pub const MOKP_ERR_RESOURCE: i32 = -3;
/// [`MokpError::NotInitialized`].
pub const MOKP_ERR_NOT_INITIALIZED: i32 = -4;
/// [`MokpError::InvalidState`].
pub const MOKP_ERR_INVALID_STATE: i32 = -5;
/// [`MokpError::MalformedInput`] and [`MokpError::Serialization`].
pub const MOKP_ERR_MALFORMED_INPUT: i32 = -6;

/// Status code for an error.
pub fn status_code(err: &MokpError) -> i32 {
    match err {
        MokpError::InvalidParameter(_) => MOKP_ERR_INVALID_PARAMETER,
        MokpError::Io(_) => MOKP_ERR_IO,
        MokpError::ResourceExhaustion(_) => MOKP_ERR_RESOURCE,
        MokpError::NotInitialized(_) => MOKP_ERR_NOT_INITIALIZED,
        MokpError::InvalidState { .. } => MOKP_ERR_INVALID_STATE,
        MokpError::MalformedInput(_) | MokpError::Serialization(_) => MOKP_ERR_MALFORMED_INPUT,
    }
}

/// Opaque session handle.
#[derive(Debug)]
pub struct MokpSession {
    session: Session,
    last_error: CString,
}

impl MokpSession {
    fn report(&mut self, result: Result<()>) -> i32 {
        match result {
            Ok(()) => MOKP_OK,
            Err(e) => {
                let code = status_code(&e);
                let msg = e.to_string().replace('\0', " ");
                self.last_error = CString::new(msg).unwrap_or_default();
                code
            }
        }
    }
}

/// Parameter block mirroring [`Parameters`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MokpParameters {
    /// Population size.
    pub population_size: usize,
    /// Iteration budget.
    pub max_iterations: usize,
    /// Archive cap; 0 means unbounded.
    pub archive_size: usize,
    /// Fraction of items flipped per perturbation.
    pub perturbation_rate: f64,
    /// Local-search acceptance tolerance.
    pub kappa: f64,
    /// Local-search depth.
    pub local_search_depth: usize,
    /// Seed, used only if `has_seed` is true.
    pub seed: u64,
    /// Whether `seed` is set.
    pub has_seed: bool,
}

impl From<&Parameters> for MokpParameters {
    fn from(p: &Parameters) -> Self {
        Self {
            population_size: p.population_size,
            max_iterations: p.max_iterations,
            archive_size: p.archive_size.unwrap_or(0),
            perturbation_rate: p.perturbation_rate,
            kappa: p.kappa,
            local_search_depth: p.local_search_depth,
            seed: p.seed.unwrap_or(0),
            has_seed: p.seed.is_some(),
        }
    }
}

impl From<&MokpParameters> for Parameters {
    fn from(p: &MokpParameters) -> Self {
        Self {
            population_size: p.population_size,
            max_iterations: p.max_iterations,
            archive_size: (p.archive_size > 0).then_some(p.archive_size),
            perturbation_rate: p.perturbation_rate,
            kappa: p.kappa,
            local_search_depth: p.local_search_depth,
            seed: p.has_seed.then_some(p.seed),
        }
    }
}

unsafe fn handle<'a>(ptr: *mut MokpSession, func: &str) -> &'a mut MokpSession {
    assert!(
        !ptr.is_null(),
        "called `{func}` with `session` as null pointer"
    );
    &mut *ptr
}

unsafe fn selection_from(ptr: *const u8, len: usize, func: &str) -> Vec<bool> {
    assert!(
        !ptr.is_null(),
        "called `{func}` with `selection` as null pointer"
    );
    std::slice::from_raw_parts(ptr, len)
        .iter()
        .map(|&b| b != 0)
        .collect()
}

unsafe fn write_values(dst: *mut f64, values: &[f64]) {
    std::ptr::copy_nonoverlapping(values.as_ptr(), dst, values.len());
}

/// Creates a new session.
///
/// The returned pointer must be released with [`mokp_session_free`].
#[no_mangle]
pub extern "C" fn mokp_session_new() -> *mut MokpSession {
    Box::into_raw(Box::new(MokpSession {
        session: Session::new(),
        last_error: CString::default(),
    }))
}

/// Frees a session. Null is ignored.
///
/// # Safety
///
/// `session` must be null or a pointer returned by [`mokp_session_new`]
/// that has not been freed.
#[no_mangle]
pub unsafe extern "C" fn mokp_session_free(session: *mut MokpSession) {
    if session.is_null() {
        return;
    }
    drop(Box::from_raw(session));
}

/// Loads a problem from row-major matrices.
///
/// # Panics
///
/// Panics if any pointer is null.
///
/// # Safety
///
/// `capacities` must point to `num_objectives` values; `weights` and
/// `profits` must each point to `num_objectives * num_items` values.
#[no_mangle]
pub unsafe extern "C" fn mokp_load_problem(
    session: *mut MokpSession,
    num_items: usize,
    num_objectives: usize,
    capacities: *const f64,
    weights: *const f64,
    profits: *const f64,
) -> i32 {
    const FUNC: &str = "mokp_load_problem";
    let h = handle(session, FUNC);
    assert!(!capacities.is_null(), "called `{FUNC}` with `capacities` as null pointer");
    assert!(!weights.is_null(), "called `{FUNC}` with `weights` as null pointer");
    assert!(!profits.is_null(), "called `{FUNC}` with `profits` as null pointer");

    let Some(len) = num_items.checked_mul(num_objectives) else {
        let err = MokpError::InvalidParameter(format!(
            "{num_objectives} x {num_items} matrix is too large"
        ));
        return h.report(Err(err));
    };

    let capacities = std::slice::from_raw_parts(capacities, num_objectives);
    let rows = |ptr: *const f64| -> Vec<Vec<f64>> {
        let flat = std::slice::from_raw_parts(ptr, len);
        if num_items == 0 {
            return vec![Vec::new(); num_objectives];
        }
        flat.chunks(num_items).map(<[f64]>::to_vec).collect()
    };
    let weights = rows(weights);
    let profits = rows(profits);

    let result = h
        .session
        .load_problem_parts(num_items, num_objectives, capacities, &weights, &profits);
    h.report(result)
}

/// Loads a problem from a text instance file.
///
/// # Panics
///
/// Panics if `session` or `path` is null.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn mokp_load_problem_file(
    session: *mut MokpSession,
    path: *const c_char,
) -> i32 {
    const FUNC: &str = "mokp_load_problem_file";
    let h = handle(session, FUNC);
    assert!(!path.is_null(), "called `{FUNC}` with `path` as null pointer");

    let result = match CStr::from_ptr(path).to_str() {
        Ok(p) => h.session.load_problem_file(p),
        Err(e) => Err(MokpError::InvalidParameter(format!("path is not UTF-8: {e}"))),
    };
    h.report(result)
}

/// Returns the default parameters.
#[no_mangle]
pub extern "C" fn mokp_default_parameters() -> MokpParameters {
    MokpParameters::from(&Session::default_parameters())
}

/// Validates parameters and builds the initial population.
///
/// # Panics
///
/// Panics if `session` or `params` is null.
///
/// # Safety
///
/// `params` must point to a valid [`MokpParameters`].
#[no_mangle]
pub unsafe extern "C" fn mokp_set_parameters(
    session: *mut MokpSession,
    params: *const MokpParameters,
) -> i32 {
    const FUNC: &str = "mokp_set_parameters";
    let h = handle(session, FUNC);
    assert!(!params.is_null(), "called `{FUNC}` with `params` as null pointer");

    let result = h.session.set_parameters(Parameters::from(&*params));
    h.report(result)
}

/// Runs up to `max_iterations` iterations and completes the session.
///
/// If `iterations_run` is not null, the number of iterations actually run
/// is written to it on success.
///
/// # Safety
///
/// `session` must be valid; `iterations_run` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn mokp_run_optimization(
    session: *mut MokpSession,
    max_iterations: usize,
    iterations_run: *mut usize,
) -> i32 {
    let h = handle(session, "mokp_run_optimization");
    let result = h.session.run_optimization(max_iterations).map(|n| {
        if !iterations_run.is_null() {
            *iterations_run = n;
        }
    });
    h.report(result)
}

/// Runs one iteration.
///
/// # Safety
///
/// `session` must be valid.
#[no_mangle]
pub unsafe extern "C" fn mokp_run_single_iteration(session: *mut MokpSession) -> i32 {
    let h = handle(session, "mokp_run_single_iteration");
    let result = h.session.run_single_iteration();
    h.report(result)
}

/// Writes the archive size to `size`.
///
/// # Safety
///
/// `session` must be valid and `size` writable.
#[no_mangle]
pub unsafe extern "C" fn mokp_get_pareto_size(session: *mut MokpSession, size: *mut usize) -> i32 {
    const FUNC: &str = "mokp_get_pareto_size";
    let h = handle(session, FUNC);
    assert!(!size.is_null(), "called `{FUNC}` with `size` as null pointer");
    let result = h.session.pareto_size().map(|n| *size = n);
    h.report(result)
}

/// Copies up to `max_solutions` archive members into caller buffers.
///
/// For member `k`, `selections[k * num_items ..]` receives its selection
/// bytes and `objectives[k * num_objectives ..]` and
/// `capacities_used[k * num_objectives ..]` its vectors. Any of the three
/// buffers may be null to skip it. The number of members copied is written
/// to `written`.
///
/// # Safety
///
/// Non-null buffers must have room for `max_solutions` rows; `written`
/// must be writable.
#[no_mangle]
pub unsafe extern "C" fn mokp_get_pareto_solutions(
    session: *mut MokpSession,
    max_solutions: usize,
    selections: *mut u8,
    objectives: *mut f64,
    capacities_used: *mut f64,
    written: *mut usize,
) -> i32 {
    const FUNC: &str = "mokp_get_pareto_solutions";
    let h = handle(session, FUNC);
    assert!(!written.is_null(), "called `{FUNC}` with `written` as null pointer");

    let result = h.session.pareto_solutions(max_solutions).map(|members| {
        for (k, s) in members.iter().enumerate() {
            copy_solution(s, k, selections, objectives, capacities_used);
        }
        *written = members.len();
    });
    h.report(result)
}

unsafe fn copy_solution(
    s: &Solution,
    row: usize,
    selections: *mut u8,
    objectives: *mut f64,
    capacities_used: *mut f64,
) {
    let n = s.selection().len();
    let m = s.objectives().len();
    if !selections.is_null() {
        let dst = std::slice::from_raw_parts_mut(selections.add(row * n), n);
        for (d, &b) in dst.iter_mut().zip(s.selection()) {
            *d = u8::from(b);
        }
    }
    if !objectives.is_null() {
        write_values(objectives.add(row * m), s.objectives());
    }
    if !capacities_used.is_null() {
        write_values(capacities_used.add(row * m), s.capacities_used());
    }
}

/// Evaluates a selection of `len` bytes, writing `num_objectives` values
/// to each non-null output buffer.
///
/// # Safety
///
/// `selection` must point to `len` bytes; non-null outputs must have room
/// for `num_objectives` values.
#[no_mangle]
pub unsafe extern "C" fn mokp_evaluate_solution(
    session: *mut MokpSession,
    selection: *const u8,
    len: usize,
    objectives: *mut f64,
    capacities_used: *mut f64,
) -> i32 {
    const FUNC: &str = "mokp_evaluate_solution";
    let h = handle(session, FUNC);
    let selection = selection_from(selection, len, FUNC);
    let result = h.session.evaluate_solution(&selection).map(|s| {
        copy_solution(&s, 0, std::ptr::null_mut(), objectives, capacities_used);
    });
    h.report(result)
}

/// Writes whether a selection of `len` bytes is feasible to `feasible`.
///
/// # Safety
///
/// `selection` must point to `len` bytes and `feasible` must be writable.
#[no_mangle]
pub unsafe extern "C" fn mokp_is_feasible(
    session: *mut MokpSession,
    selection: *const u8,
    len: usize,
    feasible: *mut bool,
) -> i32 {
    const FUNC: &str = "mokp_is_feasible";
    let h = handle(session, FUNC);
    assert!(!feasible.is_null(), "called `{FUNC}` with `feasible` as null pointer");
    let selection = selection_from(selection, len, FUNC);
    let result = h.session.is_feasible(&selection).map(|f| *feasible = f);
    h.report(result)
}

/// Message of the last failed call on this session, or an empty string.
///
/// The pointer stays valid until the next failing call or until the
/// session is freed.
///
/// # Safety
///
/// `session` must be valid.
#[no_mangle]
pub unsafe extern "C" fn mokp_get_last_error(session: *mut MokpSession) -> *const c_char {
    handle(session, "mokp_get_last_error").last_error.as_ptr()
}

/// Writes the dimensions of the loaded problem.
///
/// # Safety
///
/// `session` must be valid; both outputs must be writable.
#[no_mangle]
pub unsafe extern "C" fn mokp_get_problem_info(
    session: *mut MokpSession,
    num_objectives: *mut usize,
    num_items: *mut usize,
) -> i32 {
    const FUNC: &str = "mokp_get_problem_info";
    let h = handle(session, FUNC);
    assert!(
        !num_objectives.is_null() && !num_items.is_null(),
        "called `{FUNC}` with a null output pointer"
    );
    let result = h.session.problem_info().map(|(m, n)| {
        *num_objectives = m;
        *num_items = n;
    });
    h.report(result)
}

/// Current state as its numeric code (see
/// [`SolverState::code`](crate::engine::SolverState::code)).
///
/// # Safety
///
/// `session` must be valid.
#[no_mangle]
pub unsafe extern "C" fn mokp_get_state(session: *mut MokpSession) -> i32 {
    handle(session, "mokp_get_state").session.state().code()
}

/// Wall time of the last iteration in seconds, or 0 if none ran.
///
/// # Safety
///
/// `session` must be valid.
#[no_mangle]
pub unsafe extern "C" fn mokp_get_last_iteration_time(session: *mut MokpSession) -> f64 {
    handle(session, "mokp_get_last_iteration_time")
        .session
        .last_iteration_time()
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Saves the archive as JSON records to `path`.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn mokp_save_results(session: *mut MokpSession, path: *const c_char) -> i32 {
    const FUNC: &str = "mokp_save_results";
    let h = handle(session, FUNC);
    assert!(!path.is_null(), "called `{FUNC}` with `path` as null pointer");

    let result = match CStr::from_ptr(path).to_str() {
        Ok(p) => h
            .session
            .pareto_solutions(usize::MAX)
            .and_then(|members| persist::save_results_to_path(p, members)),
        Err(e) => Err(MokpError::InvalidParameter(format!("path is not UTF-8: {e}"))),
    };
    h.report(result)
}

/// Releases the problem, population and archive. The handle stays valid
/// and returns to the uninitialized state.
///
/// # Safety
///
/// `session` must be valid.
#[no_mangle]
pub unsafe extern "C" fn mokp_cleanup(session: *mut MokpSession) {
    handle(session, "mokp_cleanup").session.cleanup();
}
