//! Macros.

/// Logs at some verbosity level. Inactive in bench mode.
///
/// - `@err`: always active,
/// - `@warn`, `@info`: verbosity 1 or more,
/// - `@verb`: verbosity 2 or more,
/// - `@debug`: verbosity 3 or more.
#[cfg(not(feature = "bench"))]
macro_rules! log {
    (@err $($tail:tt)*) => (
        println!(
            "; {} {}",
            $crate::common::conf.bad("error:"), format!($($tail)*)
        )
    );
    (@warn $($tail:tt)*) => (
        if $crate::common::conf.verb >= 1 {
            println!(
                "; {} {}",
                $crate::common::conf.sad("warning:"), format!($($tail)*)
            )
        }
    );
    (@info $($tail:tt)*) => (
        if $crate::common::conf.verb >= 1 {
            println!("; {}", format!($($tail)*))
        }
    );
    (@verb $($tail:tt)*) => (
        if $crate::common::conf.verb >= 2 {
            println!("; {}", format!($($tail)*))
        }
    );
    (@debug $($tail:tt)*) => (
        if $crate::common::conf.verb >= 3 {
            println!("; {}", format!($($tail)*))
        }
    );
}
#[cfg(feature = "bench")]
macro_rules! log {
    ($($tt:tt)*) => {
        ()
    };
}

/// Logs at debug level.
#[allow(unused_macros)]
macro_rules! log_debug {
    ($($tt:tt)*) => (
        log! { @debug $($tt)* }
    );
}

/// Logs a warning.
#[allow(unused_macros)]
macro_rules! warn {
    ($($tt:tt)*) => (
        log! { @warn $($tt)* }
    );
}

/// Profiling macro.
///
/// If passed `self`, assumes `self` has a `_profiler` field.
#[macro_export]
#[cfg(not(feature = "bench"))]
macro_rules! profile {
    ( | $prof:ident | $stat:expr => add $e:expr ) => (
        $prof.stat_do( $stat, |val| val + $e )
    );
    ( | $prof:ident | $meth:ident $( $scope:expr ),+ $(,)* ) => (
        $prof.$meth(
            vec![ $($scope),+ ]
        )
    );
    ( $slf:ident $stat:expr => add $e:expr ) => ({
        let prof = & $slf._profiler;
        profile! { |prof| $stat => add $e }
    });
    ( $slf:ident $meth:ident $( $scope:expr ),+ $(,)* ) => ({
        let prof = & $slf._profiler;
        profile! { |prof| $meth $($scope),+ }
    });
}
#[cfg(feature = "bench")]
macro_rules! profile {
    ( $($tt:tt)* ) => {
        ()
    };
}
