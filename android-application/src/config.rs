use core::fmt;
use std::sync::{Arc, RwLock};

use bitflags::bitflags;

/// Screen orientation
///
/// See [the Configuration docs](https://developer.android.com/reference/android/content/res/Configuration#orientation)
///
/// # Android Extensible Enum
///
/// This is a runtime extensible enum and should be handled similar to a
/// `#[non_exhaustive]` enum to maintain forwards compatibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum Orientation {
    Undefined = 0,
    Portrait = 1,
    Landscape = 2,
    /// Deprecated by Android, but still reported by some devices
    Square = 3,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// The kind of touch screen attached to the device
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum Touchscreen {
    Undefined = 0,
    NoTouch = 1,
    Stylus = 2,
    Finger = 3,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// The kind of keyboard attached to the device
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum Keyboard {
    Undefined = 0,
    NoKeys = 1,
    Qwerty = 2,
    TwelveKey = 3,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// Whether any keyboard is available, including soft keyboards
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum KeysHidden {
    Undefined = 0,
    No = 1,
    Yes = 2,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// The kind of navigation method available on the device
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum Navigation {
    Undefined = 0,
    NoNav = 1,
    Dpad = 2,
    Trackball = 3,
    Wheel = 4,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// The overall UI mode type (the `UI_MODE_TYPE_MASK` bits of `uiMode`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum UiModeType {
    Undefined = 0,
    Normal = 1,
    Desk = 2,
    Car = 3,
    Television = 4,
    Appliance = 5,
    Watch = 6,
    VrHeadset = 7,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// Night mode (the `UI_MODE_NIGHT_MASK` bits of `uiMode`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum UiModeNight {
    Undefined = 0,
    No = 0x10,
    Yes = 0x20,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// Layout direction (the `SCREENLAYOUT_LAYOUTDIR_MASK` bits of `screenLayout`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum LayoutDir {
    Undefined = 0,
    Ltr = 1,
    Rtl = 2,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// Screen size class (the `SCREENLAYOUT_SIZE_MASK` bits of `screenLayout`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum ScreenSize {
    Undefined = 0,
    Small = 1,
    Normal = 2,
    Large = 3,
    XLarge = 4,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// Whether the screen is significantly taller or wider than usual (the
/// `SCREENLAYOUT_LONG_MASK` bits of `screenLayout`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum ScreenLong {
    Undefined = 0,
    No = 0x10,
    Yes = 0x20,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

/// Whether the screen has a round shape (the `SCREENLAYOUT_ROUND_MASK` bits
/// of `screenLayout`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::FromPrimitive, num_enum::IntoPrimitive,
)]
#[non_exhaustive]
#[repr(i32)]
pub enum ScreenRound {
    Undefined = 0,
    No = 0x100,
    Yes = 0x200,

    #[doc(hidden)]
    #[num_enum(catch_all)]
    __Unknown(i32),
}

const UI_MODE_TYPE_MASK: i32 = 0x0f;
const UI_MODE_NIGHT_MASK: i32 = 0x30;
const SCREENLAYOUT_SIZE_MASK: i32 = 0x0f;
const SCREENLAYOUT_LONG_MASK: i32 = 0x30;
const SCREENLAYOUT_ROUND_MASK: i32 = 0x300;
const SCREENLAYOUT_LAYOUTDIR_MASK: i32 = 0xc0;
const SCREENLAYOUT_LAYOUTDIR_SHIFT: i32 = 6;

bitflags! {
    /// The set of fields that differ between two configurations
    ///
    /// The bit values match `android.content.pm.ActivityInfo.CONFIG_*` so
    /// they can be compared with an `android:configChanges` mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConfigChanges: u32 {
        const MCC = 0x0001;
        const MNC = 0x0002;
        const LOCALE = 0x0004;
        const TOUCHSCREEN = 0x0008;
        const KEYBOARD = 0x0010;
        const KEYBOARD_HIDDEN = 0x0020;
        const NAVIGATION = 0x0040;
        const ORIENTATION = 0x0080;
        const SCREEN_LAYOUT = 0x0100;
        const UI_MODE = 0x0200;
        const SCREEN_SIZE = 0x0400;
        const SMALLEST_SCREEN_SIZE = 0x0800;
        const DENSITY = 0x1000;
        const LAYOUT_DIRECTION = 0x2000;
        const FONT_SCALE = 0x4000_0000;
    }
}

/// A snapshot of an `android.content.res.Configuration`
///
/// Undefined dimensions (which Android reports as `0`) are represented as
/// `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub font_scale: f32,
    pub mcc: i32,
    pub mnc: i32,
    /// Two (or three) letter ISO 639 language code, if a language is set
    pub language: Option<String>,
    /// Two letter ISO 3166 country code, if set
    pub country: Option<String>,
    pub orientation: Orientation,
    pub touchscreen: Touchscreen,
    pub keyboard: Keyboard,
    pub keys_hidden: KeysHidden,
    pub navigation: Navigation,
    pub ui_mode_type: UiModeType,
    pub ui_mode_night: UiModeNight,
    pub layout_direction: LayoutDir,
    pub screen_size: ScreenSize,
    pub screen_long: ScreenLong,
    pub screen_round: ScreenRound,
    pub screen_width_dp: Option<i32>,
    pub screen_height_dp: Option<i32>,
    pub smallest_screen_width_dp: Option<i32>,
    pub density_dpi: Option<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            font_scale: 1.0,
            mcc: 0,
            mnc: 0,
            language: None,
            country: None,
            orientation: Orientation::Undefined,
            touchscreen: Touchscreen::Undefined,
            keyboard: Keyboard::Undefined,
            keys_hidden: KeysHidden::Undefined,
            navigation: Navigation::Undefined,
            ui_mode_type: UiModeType::Undefined,
            ui_mode_night: UiModeNight::Undefined,
            layout_direction: LayoutDir::Undefined,
            screen_size: ScreenSize::Undefined,
            screen_long: ScreenLong::Undefined,
            screen_round: ScreenRound::Undefined,
            screen_width_dp: None,
            screen_height_dp: None,
            smallest_screen_width_dp: None,
            density_dpi: None,
        }
    }
}

impl Configuration {
    /// Splits a packed `uiMode` value into its type and night components
    pub fn set_ui_mode(&mut self, ui_mode: i32) {
        self.ui_mode_type = UiModeType::from(ui_mode & UI_MODE_TYPE_MASK);
        self.ui_mode_night = UiModeNight::from(ui_mode & UI_MODE_NIGHT_MASK);
    }

    /// Splits a packed `screenLayout` value into its size, long, round and
    /// layout direction components
    pub fn set_screen_layout(&mut self, screen_layout: i32) {
        self.screen_size = ScreenSize::from(screen_layout & SCREENLAYOUT_SIZE_MASK);
        self.screen_long = ScreenLong::from(screen_layout & SCREENLAYOUT_LONG_MASK);
        self.screen_round = ScreenRound::from(screen_layout & SCREENLAYOUT_ROUND_MASK);
        self.layout_direction = LayoutDir::from(
            (screen_layout & SCREENLAYOUT_LAYOUTDIR_MASK) >> SCREENLAYOUT_LAYOUTDIR_SHIFT,
        );
    }

    /// The locale as a `language-COUNTRY` tag, if a language is set
    pub fn locale(&self) -> Option<String> {
        let language = self.language.as_ref()?;
        match &self.country {
            Some(country) => Some(format!("{language}-{country}")),
            None => Some(language.clone()),
        }
    }

    /// Reports which fields of `other` differ from `self`
    ///
    /// As with Android's `Configuration.diff()`, a locale change also counts as
    /// a layout direction change.
    pub fn diff(&self, other: &Configuration) -> ConfigChanges {
        let mut changes = ConfigChanges::empty();

        changes.set(ConfigChanges::FONT_SCALE, self.font_scale != other.font_scale);
        changes.set(ConfigChanges::MCC, self.mcc != other.mcc);
        changes.set(ConfigChanges::MNC, self.mnc != other.mnc);
        if self.language != other.language || self.country != other.country {
            changes |= ConfigChanges::LOCALE | ConfigChanges::LAYOUT_DIRECTION;
        }
        changes.set(ConfigChanges::TOUCHSCREEN, self.touchscreen != other.touchscreen);
        changes.set(ConfigChanges::KEYBOARD, self.keyboard != other.keyboard);
        changes.set(ConfigChanges::KEYBOARD_HIDDEN, self.keys_hidden != other.keys_hidden);
        changes.set(ConfigChanges::NAVIGATION, self.navigation != other.navigation);
        changes.set(ConfigChanges::ORIENTATION, self.orientation != other.orientation);
        changes.set(
            ConfigChanges::SCREEN_LAYOUT,
            self.screen_size != other.screen_size
                || self.screen_long != other.screen_long
                || self.screen_round != other.screen_round,
        );
        changes.set(
            ConfigChanges::UI_MODE,
            self.ui_mode_type != other.ui_mode_type || self.ui_mode_night != other.ui_mode_night,
        );
        changes.set(
            ConfigChanges::SCREEN_SIZE,
            self.screen_width_dp != other.screen_width_dp
                || self.screen_height_dp != other.screen_height_dp,
        );
        changes.set(
            ConfigChanges::SMALLEST_SCREEN_SIZE,
            self.smallest_screen_width_dp != other.smallest_screen_width_dp,
        );
        changes.set(ConfigChanges::DENSITY, self.density_dpi != other.density_dpi);
        if self.layout_direction != other.layout_direction {
            changes |= ConfigChanges::LAYOUT_DIRECTION;
        }

        changes
    }
}

/// A (cheaply clonable) reference to the application's [`Configuration`]
///
/// This provides a thread-safe way to access the latest configuration state
/// without copying the whole snapshot.
///
/// When the application is notified of a configuration change, the change
/// becomes visible via pre-existing configuration references.
#[derive(Clone)]
pub struct ConfigurationRef {
    config: Arc<RwLock<Configuration>>,
}
impl PartialEq for ConfigurationRef {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.config, &other.config) {
            true
        } else {
            let other_guard = other.config.read().unwrap();
            self.config.read().unwrap().eq(&*other_guard)
        }
    }
}

impl fmt::Debug for ConfigurationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.config.read().unwrap().fmt(f)
    }
}

impl ConfigurationRef {
    pub(crate) fn new(config: Configuration) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Stores `src` as the latest configuration and reports what changed
    pub(crate) fn replace(&self, src: Configuration) -> ConfigChanges {
        let mut guard = self.config.write().unwrap();
        let changes = guard.diff(&src);
        *guard = src;
        changes
    }

    /// Returns a deep copy of the full application configuration
    pub fn copy(&self) -> Configuration {
        self.config.read().unwrap().clone()
    }

    pub fn font_scale(&self) -> f32 {
        self.config.read().unwrap().font_scale
    }

    /// Returns the language, if a language is set
    pub fn language(&self) -> Option<String> {
        self.config.read().unwrap().language.clone()
    }

    /// Returns the country code, if set
    pub fn country(&self) -> Option<String> {
        self.config.read().unwrap().country.clone()
    }

    pub fn locale(&self) -> Option<String> {
        self.config.read().unwrap().locale()
    }

    pub fn orientation(&self) -> Orientation {
        self.config.read().unwrap().orientation
    }

    pub fn ui_mode_type(&self) -> UiModeType {
        self.config.read().unwrap().ui_mode_type
    }

    pub fn ui_mode_night(&self) -> UiModeNight {
        self.config.read().unwrap().ui_mode_night
    }

    pub fn layout_direction(&self) -> LayoutDir {
        self.config.read().unwrap().layout_direction
    }

    pub fn screen_width_dp(&self) -> Option<i32> {
        self.config.read().unwrap().screen_width_dp
    }

    pub fn screen_height_dp(&self) -> Option<i32> {
        self.config.read().unwrap().screen_height_dp
    }

    pub fn smallest_screen_width_dp(&self) -> Option<i32> {
        self.config.read().unwrap().smallest_screen_width_dp
    }

    /// Returns the screen density in dpi.
    ///
    /// On some devices it can return values outside of the standard density
    /// buckets.
    pub fn density_dpi(&self) -> Option<u32> {
        self.config.read().unwrap().density_dpi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portrait() -> Configuration {
        Configuration {
            font_scale: 1.0,
            language: Some("en".to_string()),
            country: Some("US".to_string()),
            orientation: Orientation::Portrait,
            screen_width_dp: Some(411),
            screen_height_dp: Some(731),
            smallest_screen_width_dp: Some(411),
            density_dpi: Some(420),
            ..Default::default()
        }
    }

    #[test]
    fn diff_of_identical_configs_is_empty() {
        assert!(portrait().diff(&portrait()).is_empty());
    }

    #[test]
    fn rotation_changes_orientation_and_size() {
        let mut landscape = portrait();
        landscape.orientation = Orientation::Landscape;
        landscape.screen_width_dp = Some(731);
        landscape.screen_height_dp = Some(411);

        assert_eq!(
            portrait().diff(&landscape),
            ConfigChanges::ORIENTATION | ConfigChanges::SCREEN_SIZE
        );
    }

    #[test]
    fn locale_and_night_mode_changes() {
        let mut other = portrait();
        other.country = Some("GB".to_string());
        other.set_ui_mode(0x21);

        let changes = portrait().diff(&other);
        assert_eq!(
            changes,
            ConfigChanges::LOCALE | ConfigChanges::LAYOUT_DIRECTION | ConfigChanges::UI_MODE
        );
        assert_eq!(other.ui_mode_type, UiModeType::Normal);
        assert_eq!(other.ui_mode_night, UiModeNight::Yes);
    }

    #[test]
    fn screen_layout_unpacking() {
        let mut config = Configuration::default();
        // SCREENLAYOUT_LAYOUTDIR_RTL | SCREENLAYOUT_SIZE_LARGE
        config.set_screen_layout(0x80 | 0x03);
        assert_eq!(config.layout_direction, LayoutDir::Rtl);
        assert_eq!(config.screen_size, ScreenSize::Large);
        assert_eq!(config.screen_long, ScreenLong::Undefined);
    }

    #[test]
    fn screen_layout_covers_long_and_round() {
        let mut long = portrait();
        // SCREENLAYOUT_SIZE_NORMAL | SCREENLAYOUT_LONG_YES
        long.set_screen_layout(0x02 | 0x20);
        let mut round = long.clone();
        // ... | SCREENLAYOUT_ROUND_YES
        round.set_screen_layout(0x02 | 0x20 | 0x200);

        assert_eq!(long.screen_size, round.screen_size);
        assert_eq!(long.screen_long, ScreenLong::Yes);
        assert_eq!(round.screen_round, ScreenRound::Yes);
        assert_eq!(long.diff(&round), ConfigChanges::SCREEN_LAYOUT);

        let mut rtl = long.clone();
        rtl.set_screen_layout(0x02 | 0x20 | 0x80);
        assert_eq!(long.diff(&rtl), ConfigChanges::LAYOUT_DIRECTION);
    }

    #[test]
    fn unknown_values_are_preserved() {
        let orientation = Orientation::from(7);
        assert_eq!(i32::from(orientation), 7);
    }

    #[test]
    fn locale_tag() {
        assert_eq!(portrait().locale().as_deref(), Some("en-US"));

        let mut config = portrait();
        config.country = None;
        assert_eq!(config.locale().as_deref(), Some("en"));

        config.language = None;
        assert_eq!(config.locale(), None);
    }

    #[test]
    fn replace_is_visible_through_clones() {
        let config = ConfigurationRef::new(portrait());
        let observer = config.clone();

        let mut landscape = portrait();
        landscape.orientation = Orientation::Landscape;
        let changes = config.replace(landscape);

        assert_eq!(changes, ConfigChanges::ORIENTATION);
        assert_eq!(observer.orientation(), Orientation::Landscape);
        assert_eq!(observer, config);
    }
}
