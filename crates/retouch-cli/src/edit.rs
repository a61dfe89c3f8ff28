//! Compact text form of an edit, as given to `--edit`.
//!
//! ```text
//! blur:5            rotate:90          rotate:-45@10,20
//! resize:200x       resize:x100        resize:200x100!
//! saturation:-20    contrast:10        tone:5
//! filter:sepia      whitebalance:gray  select:mask.png
//! invert-select:mask.png               undo    redo
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use retouch_core::Transform;
use retouch_core::balance::BalanceMode;
use retouch_core::resize::ResizeParams;
use retouch_core::rotate::RotateParams;
use retouch_core::transform::{
    BlurParams, ContrastParams, FilterKind, FilterParams, SaturationParams, ToneParams,
    WhiteBalanceParams,
};

use crate::error::CliError;

/// One step of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Apply a parameterized transform.
    Apply(Transform),
    /// Crop with a mask read from a file.
    Select {
        /// Mask image; its luma is the selection weight.
        mask: PathBuf,
        /// Keep the unselected part instead.
        invert: bool,
    },
    /// Undo the previous edit.
    Undo,
    /// Redo the last undone edit.
    Redo,
}

impl From<Transform> for Step {
    fn from(transform: Transform) -> Self {
        Self::Apply(transform)
    }
}

impl FromStr for Step {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = s.split_once(':').unwrap_or((s, ""));
        let arg = arg.trim();
        let step = match name.trim() {
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "blur" => Transform::Blur(BlurParams {
                half_width: number(s, arg)?,
            })
            .into(),
            "rotate" => Transform::Rotate(parse_rotate(s, arg)?).into(),
            "resize" => Transform::Resize(parse_resize(s, arg)?).into(),
            "saturation" => Transform::Saturation(SaturationParams {
                amount: number(s, arg)?,
            })
            .into(),
            "contrast" => Transform::Contrast(ContrastParams {
                amount: number(s, arg)?,
            })
            .into(),
            "tone" => Transform::Tone(ToneParams {
                amount: number(s, arg)?,
            })
            .into(),
            "filter" => Transform::Filter(FilterParams {
                kind: match arg {
                    "grayscale" | "gray" => FilterKind::Grayscale,
                    "sepia" => FilterKind::Sepia,
                    "ghost" => FilterKind::Ghost,
                    _ => return Err(CliError::parse(s, "expected grayscale, sepia or ghost")),
                },
            })
            .into(),
            "whitebalance" => Transform::WhiteBalance(WhiteBalanceParams {
                mode: match arg {
                    "" | "gray" => BalanceMode::Gray,
                    "white" => BalanceMode::White,
                    _ => return Err(CliError::parse(s, "expected gray or white")),
                },
            })
            .into(),
            "select" | "invert-select" if !arg.is_empty() => Self::Select {
                mask: PathBuf::from(arg),
                invert: name == "invert-select",
            },
            "select" | "invert-select" => return Err(CliError::parse(s, "missing mask path")),
            other => return Err(CliError::parse(s, format!("unknown edit {other:?}"))),
        };
        Ok(step)
    }
}

fn number<T: FromStr>(edit: &str, arg: &str) -> Result<T, CliError>
where
    T::Err: std::fmt::Display,
{
    arg.parse()
        .map_err(|e| CliError::parse(edit, format!("{arg:?}: {e}")))
}

/// `ANGLE` or `ANGLE@X,Y`.
fn parse_rotate(edit: &str, arg: &str) -> Result<RotateParams, CliError> {
    let Some((angle, center)) = arg.split_once('@') else {
        return Ok(RotateParams::degrees(number(edit, arg)?));
    };
    let (x, y) = center
        .split_once(',')
        .ok_or_else(|| CliError::parse(edit, "center must be X,Y"))?;
    Ok(RotateParams {
        angle_degrees: number(edit, angle)?,
        center: Some((number(edit, x)?, number(edit, y)?)),
    })
}

/// `WxH`, either side optional; a trailing `!` disables aspect
/// preservation.
fn parse_resize(edit: &str, arg: &str) -> Result<ResizeParams, CliError> {
    let (arg, exact) = arg
        .strip_suffix('!')
        .map_or((arg, false), |rest| (rest, true));
    let (w, h) = arg
        .split_once('x')
        .ok_or_else(|| CliError::parse(edit, "expected WxH, Wx or xH"))?;
    let side = |s: &str| -> Result<Option<u32>, CliError> {
        if s.is_empty() {
            Ok(None)
        } else {
            number(edit, s).map(Some)
        }
    };
    let params = ResizeParams {
        width: side(w)?,
        height: side(h)?,
        preserve_aspect: !exact,
    };
    if params.width.is_none() && params.height.is_none() {
        return Err(CliError::parse(edit, "give at least one of width and height"));
    }
    Ok(params)
}
