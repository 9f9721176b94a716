//! Switches that change how operations behave while they run.
//!
//! The only switch right now is [Setting::EnableBackprop], which decides
//! whether invoking an operation records it for a later backward pass.
//! Settings are scoped to the current thread, as are the graphs they
//! influence.

use std::cell::Cell;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
  /// Link operation results to their creators. On by default.
  EnableBackprop,
}

thread_local! {
  static ENABLE_BACKPROP: Cell<bool> = Cell::new(true);
}


/// Access to the current value of every [Setting].

#[derive(Debug, Clone, Copy)]
pub struct Config;

impl Config {
  pub fn get(setting: Setting) -> bool {
    match setting {
      Setting::EnableBackprop => ENABLE_BACKPROP.with(|flag| flag.get() ),
    }
  }

  /// Change a setting, returning its previous value.
  ///
  /// Prefer [using_config], which restores the previous value automatically.

  pub fn set(setting: Setting, value: bool) -> bool {
    match setting {
      Setting::EnableBackprop => ENABLE_BACKPROP.with(|flag| flag.replace(value) ),
    }
  }
}

pub fn is_backprop_enabled() -> bool {
  Config::get(Setting::EnableBackprop)
}


/// Restores a setting to its previous value when dropped.
///
/// Returned by [using_config] and [no_grad]. Because restoration happens on drop,
/// it also happens when the enclosed code returns early or panics.

#[must_use = "the setting is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ConfigGuard {
  setting: Setting,
  previous: bool,
}

impl Drop for ConfigGuard {
  fn drop(&mut self) {
    Config::set(self.setting, self.previous);
  }
}

/// Set `setting` to `value` until the returned guard goes out of scope.

pub fn using_config(setting: Setting, value: bool) -> ConfigGuard {
  let previous = Config::set(setting, value);
  ConfigGuard { setting, previous }
}

/// Disable graph recording until the returned guard goes out of scope.
///
/// ```
/// use microdiff::{ config::no_grad, Variable };
///
/// let x = Variable::scalar(2.0f64);
/// let y = {
///   let _guard = no_grad();
///   x.square().unwrap()
/// };
/// assert!(y.creator().is_none());
/// ```

pub fn no_grad() -> ConfigGuard {
  using_config(Setting::EnableBackprop, false)
}
