//! Naming grammar for scale deformation targets.
//!
//! A scale key is named `<base>--{pos|neg}<Axis>`; the stereo control that
//! merges a pair is named `<base>--scale<Axis>`.

use std::fmt;

const SEPARATOR: &str = "--";
const SCALE: &str = "scale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Pos,
    Neg,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Pos => "pos",
            Direction::Neg => "neg",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Pos => Direction::Neg,
            Direction::Neg => Direction::Pos,
        }
    }
}

/// A parsed `<base>--{pos|neg}<Axis>` name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScaleKeyName {
    pub base: String,
    pub direction: Direction,
    pub axis: char,
}

impl ScaleKeyName {
    pub fn new(base: impl Into<String>, direction: Direction, axis: char) -> Self {
        ScaleKeyName {
            base: base.into(),
            direction,
            axis,
        }
    }

    /// Matches exactly one trailing axis character after `--pos`/`--neg`, with a non-empty base.
    pub fn parse(name: &str) -> Option<Self> {
        let axis = name.chars().next_back()?;
        let rest = &name[..name.len() - axis.len_utf8()];
        for direction in [Direction::Neg, Direction::Pos] {
            let Some(head) = rest.strip_suffix(direction.as_str()) else {
                continue;
            };
            let base = head.strip_suffix(SEPARATOR)?;
            if base.is_empty() {
                return None;
            }
            return Some(ScaleKeyName::new(base, direction, axis));
        }
        None
    }

    /// The same key with the opposite direction.
    pub fn sibling(&self) -> Self {
        ScaleKeyName::new(self.base.clone(), self.direction.flipped(), self.axis)
    }

    /// `<base>--scale<Axis>`.
    pub fn scale_control_name(&self) -> String {
        format!("{}{}{}{}", self.base, SEPARATOR, SCALE, self.axis)
    }
}

impl fmt::Display for ScaleKeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.base,
            SEPARATOR,
            self.direction.as_str(),
            self.axis
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    /// Parse an axis list such as `"XZ"`; order is kept, repeats are rejected.
    pub fn parse_list(text: &str) -> Result<Vec<Axis>, String> {
        let mut axes = Vec::new();
        for letter in text.chars() {
            let axis =
                Axis::from_letter(letter).ok_or_else(|| format!("unknown axis `{}`", letter))?;
            if axes.contains(&axis) {
                return Err(format!("axis `{}` given more than once", axis.letter()));
            }
            axes.push(axis);
        }
        Ok(axes)
    }
}

/// Bone and object names become target base names with `_` and spaces turned into `-`.
pub fn sanitize_name(name: &str) -> String {
    name.replace(['_', ' '], "-")
}

/// Scale key names for one base: per axis, `--pos` then `--neg`.
pub fn scale_key_names(base: &str, axes: &[Axis]) -> Vec<String> {
    axes.iter()
        .flat_map(|axis| {
            [Direction::Pos, Direction::Neg]
                .map(|direction| ScaleKeyName::new(base, direction, axis.letter()).to_string())
        })
        .collect()
}

/// Whether `name` is a scale key generated for `base`.
pub fn is_scale_key_of(name: &str, base: &str) -> bool {
    ScaleKeyName::parse(name).is_some_and(|key| key.base == base)
}

/// Crowbar decompiles stereo targets as `left+right` names. Keep the part before
/// the first `+` and drop a trailing `L`. Names without `+` are left alone.
pub fn clean_crowbar_name(name: &str) -> Option<String> {
    let (head, _) = name.split_once('+')?;
    Some(head.strip_suffix('L').unwrap_or(head).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_neg_and_pos() {
        assert_eq!(
            ScaleKeyName::parse("brow--negY"),
            Some(ScaleKeyName::new("brow", Direction::Neg, 'Y'))
        );
        assert_eq!(
            ScaleKeyName::parse("jaw-bone--posX"),
            Some(ScaleKeyName::new("jaw-bone", Direction::Pos, 'X'))
        );
    }

    #[test]
    fn parse_accepts_any_single_axis_character() {
        assert_eq!(
            ScaleKeyName::parse("brow--negW").map(|k| k.axis),
            Some('W')
        );
    }

    #[test]
    fn parse_boundary_cases() {
        assert_eq!(ScaleKeyName::parse(""), None);
        assert_eq!(ScaleKeyName::parse("negX"), None);
        assert_eq!(ScaleKeyName::parse("--negX"), None);
        assert_eq!(ScaleKeyName::parse("brow-negX"), None);
        assert_eq!(ScaleKeyName::parse("brow--negXY"), None);
        assert_eq!(ScaleKeyName::parse("brow--neg"), None);
        assert_eq!(ScaleKeyName::parse("brow--scaleX"), None);
        assert_eq!(ScaleKeyName::parse("brow--negX-extra"), None);
    }

    #[test]
    fn sibling_and_scale_name() {
        let key = ScaleKeyName::parse("cheek--negZ").expect("scale key");
        assert_eq!(key.sibling().to_string(), "cheek--posZ");
        assert_eq!(key.scale_control_name(), "cheek--scaleZ");
        assert_eq!(key.sibling().sibling(), key);
    }

    #[test]
    fn scale_key_names_follow_axis_order() {
        let axes = Axis::parse_list("zx").expect("axes");
        assert_eq!(
            scale_key_names("hand", &axes),
            vec!["hand--posZ", "hand--negZ", "hand--posX", "hand--negX"]
        );
    }

    #[test]
    fn axis_list_errors() {
        assert!(Axis::parse_list("XQ").is_err());
        assert!(Axis::parse_list("XX").is_err());
        assert_eq!(Axis::parse_list(""), Ok(vec![]));
    }

    #[test]
    fn sanitize_replaces_underscores_and_spaces() {
        assert_eq!(sanitize_name("ValveBiped.Bip01_L Hand"), "ValveBiped.Bip01-L-Hand");
    }

    #[test]
    fn scale_key_membership() {
        assert!(is_scale_key_of("hand--negX", "hand"));
        assert!(!is_scale_key_of("hand--negX", "han"));
        assert!(!is_scale_key_of("hand-smile", "hand"));
    }

    #[test]
    fn crowbar_names() {
        assert_eq!(clean_crowbar_name("BrowInV+BrowInVL"), Some("BrowInV".to_string()));
        assert_eq!(clean_crowbar_name("CloseLidL+CloseLidR"), Some("CloseLid".to_string()));
        assert_eq!(clean_crowbar_name("smile"), None);
    }
}
