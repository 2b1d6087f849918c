//! Parameter (`.prm`) file support.
//!
//! A parameter file is line-oriented, INI-like text with two sections:
//!
//! ```text
//! [Box info]
//! n control points x: 2
//! ...
//! rotation angle z: 0.0
//!
//! [Parameters weights]
//! parameter x: 0   0   0   0.0
//!              0   0   1   0.0
//!              ...
//! parameter y: ...
//! parameter z: ...
//! ```
//!
//! Each weight entry is `i j k weight`. The writer always lists every
//! lattice index; the reader treats unlisted entries as zero so hand-edited
//! files only need the non-zero weights. Lines starting with `#` or `;` are
//! comments.
//!
//! # Example
//!
//! ```
//! use mesh_ffd::{ParameterStore, from_prm_str, to_prm_string};
//!
//! let mut params = ParameterStore::default();
//! params.weights_y[[1, 0, 1]] = 0.25;
//!
//! let text = to_prm_string(&params).unwrap();
//! assert_eq!(from_prm_str(&text).unwrap(), params);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

use crate::{Axis, FfdError, FfdResult, MAX_CONTROL_POINTS, ParameterStore, WeightGrid};

/// Section holding the lattice resolution and box placement.
pub const BOX_SECTION: &str = "Box info";

/// Section holding the control point weights.
pub const WEIGHTS_SECTION: &str = "Parameters weights";

/// Indentation of weight entries after the first one.
const ENTRY_INDENT: &str = "             ";

impl ParameterStore {
    /// Writes the parameters to a `.prm` file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// - [`FfdError::InvalidPath`] for an empty path
    /// - [`FfdError::WeightShapeMismatch`] if the weights do not match
    ///   `n_control_points`
    /// - [`FfdError::Io`] if the file cannot be written
    pub fn write<P: AsRef<Path>>(&self, path: P) -> FfdResult<()> {
        let path = checked_path(path.as_ref())?;
        let text = to_prm_string(self)?;
        fs::write(path, text)?;
        info!(
            path = %path.display(),
            n_control_points = ?self.n_control_points,
            "Wrote FFD parameters"
        );
        Ok(())
    }

    /// Reads parameters from a `.prm` file.
    ///
    /// If the file does not exist, a default parameter set is written to
    /// `path` and returned, so the file can be edited by hand and read again.
    ///
    /// # Errors
    ///
    /// - [`FfdError::InvalidPath`] for an empty path
    /// - [`FfdError::Io`] if the file cannot be read, or the default cannot be written
    /// - a parse error ([`FfdError::is_parse`]) if the content is invalid
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mesh_ffd::ParameterStore;
    ///
    /// let params = ParameterStore::read("parameters.prm").unwrap();
    /// println!("{} control points", params.control_point_count());
    /// ```
    pub fn read<P: AsRef<Path>>(path: P) -> FfdResult<Self> {
        Self::read_or_init(path, &Self::default())
    }

    /// Reads parameters from a `.prm` file, writing `template` there first if
    /// the file does not exist.
    ///
    /// Useful for producing a correctly sized file to edit by hand:
    ///
    /// ```no_run
    /// use mesh_ffd::ParameterStore;
    ///
    /// let template = ParameterStore::new([2, 3, 2]).unwrap();
    /// let params = ParameterStore::read_or_init("parameters.prm", &template).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`ParameterStore::read`].
    pub fn read_or_init<P: AsRef<Path>>(path: P, template: &Self) -> FfdResult<Self> {
        let path = checked_path(path.as_ref())?;
        if !path.is_file() {
            info!(path = %path.display(), "Parameter file not found, writing template");
            template.write(path)?;
            return Ok(template.clone());
        }

        let text = fs::read_to_string(path)?;
        let params = from_prm_str(&text)?;
        info!(
            path = %path.display(),
            n_control_points = ?params.n_control_points,
            "Read FFD parameters"
        );
        Ok(params)
    }
}

fn checked_path(path: &Path) -> FfdResult<&Path> {
    if path.as_os_str().is_empty() {
        return Err(FfdError::InvalidPath {
            path: path.to_path_buf(),
        });
    }
    Ok(path)
}

/// Serializes parameters to `.prm` text.
///
/// Every lattice index is listed for every weight component. Floats are
/// written in shortest round-trip form, so reading the text back yields
/// identical values.
///
/// # Errors
///
/// Returns [`FfdError::WeightShapeMismatch`] if the weights do not match
/// `n_control_points`.
pub fn to_prm_string(params: &ParameterStore) -> FfdResult<String> {
    params.validate_shape()?;
    Ok(PrmText(params).to_string())
}

/// `.prm` rendering of a shape-checked parameter set.
struct PrmText<'a>(&'a ParameterStore);

impl Display for PrmText<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.0;
        writeln!(out)?;
        writeln!(out, "[{BOX_SECTION}]")?;
        writeln!(out, "# Properties of the FFD bounding box.")?;
        writeln!(out)?;
        writeln!(out, "# n control points: number of control points along x, y and z.")?;
        writeln!(out, "# A 2 x 3 x 2 lattice uses 2, 3 and 2.")?;
        for axis in Axis::ALL {
            writeln!(
                out,
                "n control points {axis}: {}",
                params.n_control_points[axis.index()]
            )?;
        }

        writeln!(out)?;
        writeln!(out, "# box length: extent of the box along the local x, y and z axes.")?;
        for axis in Axis::ALL {
            writeln!(
                out,
                "box length {axis}: {}",
                fmt_float(params.box_length[axis.index()])
            )?;
        }

        writeln!(out)?;
        writeln!(out, "# box origin: coordinates of the lattice point [0][0][0].")?;
        writeln!(out, "# The box is rotated about this point.")?;
        for axis in Axis::ALL {
            writeln!(
                out,
                "box origin {axis}: {}",
                fmt_float(params.box_origin[axis.index()])
            )?;
        }

        writeln!(out)?;
        writeln!(out, "# rotation angle: rotation about the x, y and z axes in degrees.")?;
        writeln!(out, "# The z rotation is applied last: R = Rz * Ry * Rx.")?;
        for axis in Axis::ALL {
            writeln!(
                out,
                "rotation angle {axis}: {}",
                fmt_float(params.rot_angle[axis.index()])
            )?;
        }

        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "[{WEIGHTS_SECTION}]")?;
        writeln!(out, "# Weights of the FFD control points, one line per lattice index:")?;
        writeln!(out, "#")?;
        writeln!(out, "# | x index | y index | z index | weight |")?;
        writeln!(out, "#  --------------------------------------")?;
        writeln!(out, "# |    0    |    0    |    0    |  1.0   |")?;
        writeln!(out, "# |    0    |    1    |    1    |  0.0   | <- zero, may be omitted")?;
        writeln!(out, "# |    0    |    1    |    0    | -2.1   |")?;
        writeln!(out, "#")?;
        writeln!(out, "# Omitted entries read as zero.")?;

        for axis in Axis::ALL {
            writeln!(out)?;
            writeln!(
                out,
                "# parameter {axis}: displacements along {axis}, normalized by box length {axis}."
            )?;
            write!(out, "parameter {axis}:")?;
            for (n, ([i, j, k], weight)) in params.weights(axis).iter_indexed().enumerate() {
                let indent = if n == 0 { " " } else { ENTRY_INDENT };
                writeln!(out, "{indent}{i}   {j}   {k}   {}", fmt_float(weight))?;
            }
        }
        Ok(())
    }
}

fn fmt_float(value: f64) -> String {
    format!("{value:?}")
}

/// Parses `.prm` text into a new parameter set.
///
/// Weight grids are sized from the declared resolution; entries that are
/// not listed stay zero. If an index is listed twice the later value wins.
///
/// # Errors
///
/// - [`FfdError::MissingSection`] / [`FfdError::MissingKey`] for absent entries
/// - [`FfdError::InvalidValue`] for non-numeric or out-of-range values
/// - [`FfdError::MalformedLine`] for lines that do not fit the grammar
/// - [`FfdError::IndexOutOfBounds`] for weight indices outside the lattice
pub fn from_prm_str(text: &str) -> FfdResult<ParameterStore> {
    let document = Document::parse(text)?;

    let box_info = document.section(BOX_SECTION)?;
    let mut n_control_points = [0usize; 3];
    let mut box_length = Vector3::zeros();
    let mut box_origin = Point3::origin();
    let mut rot_angle = Vector3::zeros();
    for axis in Axis::ALL {
        let a = axis.index();
        let key = format!("n control points {axis}");
        let count: usize = box_info.scalar(&key)?;
        if count == 0 {
            return Err(FfdError::invalid_value(
                key,
                "0",
                "at least one control point is required",
            ));
        }
        n_control_points[a] = count;
        box_length[a] = box_info.scalar(&format!("box length {axis}"))?;
        box_origin[a] = box_info.scalar(&format!("box origin {axis}"))?;
        rot_angle[a] = box_info.scalar(&format!("rotation angle {axis}"))?;
    }

    let weights = document.section(WEIGHTS_SECTION)?;
    let mut params = ParameterStore::new(n_control_points)
        .map_err(|_| {
            FfdError::invalid_value(
                "n control points",
                format!("{n_control_points:?}"),
                format!("lattice exceeds {MAX_CONTROL_POINTS} control points"),
            )
        })?
        .with_box_length(box_length)
        .with_box_origin(box_origin)
        .with_rot_angle(rot_angle);
    for axis in Axis::ALL {
        let key = format!("parameter {axis}");
        let entry = weights.entry(&key)?;
        let listed = fill_weights(params.weights_mut(axis), &key, entry)?;
        debug!(axis = %axis, listed, "Parsed weight entries");
    }

    Ok(params)
}

/// Reads `i j k weight` lines into `grid`, returning the number of entries.
fn fill_weights(grid: &mut WeightGrid, key: &str, entry: &Entry) -> FfdResult<usize> {
    let mut seen = HashSet::new();
    for (line, text) in &entry.lines {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let [i, j, k, weight] = tokens.as_slice() else {
            return Err(FfdError::malformed(
                *line,
                format!(
                    "expected 'i j k weight' for '{key}', found {} token(s)",
                    tokens.len()
                ),
            ));
        };

        let index = [
            parse_value::<usize>(key, i)?,
            parse_value::<usize>(key, j)?,
            parse_value::<usize>(key, k)?,
        ];
        let weight = parse_value::<f64>(key, weight)?;

        if !seen.insert(index) {
            warn!(key, index = ?index, line, "Weight listed twice, keeping the later value");
        }
        let [i, j, k] = index;
        grid.set(i, j, k, weight)?;
    }
    Ok(entry.lines.len())
}

fn parse_value<T>(key: &str, raw: &str) -> FfdResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e: T::Err| FfdError::invalid_value(key, raw, e.to_string()))
}

/// A key's value: the text after the separator plus any continuation lines,
/// each tagged with its 1-based line number. Blank values are dropped.
#[derive(Debug, Default)]
struct Entry {
    lines: Vec<(usize, String)>,
}

#[derive(Debug, Default)]
struct Section {
    name: String,
    entries: HashMap<String, Entry>,
}

impl Section {
    fn entry(&self, key: &str) -> FfdResult<&Entry> {
        self.entries.get(key).ok_or_else(|| FfdError::MissingKey {
            section: self.name.clone(),
            key: key.to_string(),
        })
    }

    fn scalar<T>(&self, key: &str) -> FfdResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.entry(key)?.lines.as_slice() {
            [(_, raw)] => parse_value(key, raw),
            [] => Err(FfdError::invalid_value(key, "", "value is empty")),
            [(line, _), ..] => Err(FfdError::malformed(
                *line,
                format!("'{key}' expects a single value"),
            )),
        }
    }
}

#[derive(Debug, Default)]
struct Document {
    sections: HashMap<String, Section>,
}

impl Document {
    fn parse(text: &str) -> FfdResult<Self> {
        let mut document = Self::default();
        let mut section: Option<String> = None;
        let mut key: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = strip_inline_comment(raw).trim();
            if content.is_empty() || content.starts_with('#') || content.starts_with(';') {
                continue;
            }

            // Indented lines continue the value of the previous key
            if raw.starts_with(char::is_whitespace) {
                if let (Some(s), Some(k)) = (&section, &key) {
                    if let Some(entry) = document
                        .sections
                        .get_mut(s)
                        .and_then(|sec| sec.entries.get_mut(k))
                    {
                        entry.lines.push((line, content.to_string()));
                        continue;
                    }
                }
            }

            if let Some(name) = content
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                let name = name.trim().to_string();
                document
                    .sections
                    .entry(name.clone())
                    .or_insert_with(|| Section {
                        name: name.clone(),
                        entries: HashMap::new(),
                    });
                section = Some(name);
                key = None;
                continue;
            }

            let Some(current) = section.as_ref().and_then(|s| document.sections.get_mut(s))
            else {
                return Err(FfdError::malformed(line, "entry before any [section] header"));
            };
            let Some(sep) = content.find([':', '=']) else {
                return Err(FfdError::malformed(
                    line,
                    format!("expected 'key: value', found {content:?}"),
                ));
            };

            let name = content[..sep].trim().to_lowercase();
            if current.entries.contains_key(&name) {
                return Err(FfdError::malformed(
                    line,
                    format!("duplicate key '{name}' in [{}]", current.name),
                ));
            }
            let value = content[sep + 1..].trim();
            let mut entry = Entry::default();
            if !value.is_empty() {
                entry.lines.push((line, value.to_string()));
            }
            current.entries.insert(name.clone(), entry);
            key = Some(name);
        }

        Ok(document)
    }

    fn section(&self, name: &str) -> FfdResult<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| FfdError::MissingSection {
                section: name.to_string(),
            })
    }
}

/// Drops a trailing `# comment` that follows whitespace.
fn strip_inline_comment(line: &str) -> &str {
    let mut prev_is_space = true;
    for (pos, ch) in line.char_indices() {
        if ch == '#' && prev_is_space {
            return &line[..pos];
        }
        prev_is_space = ch.is_whitespace();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_PRM: &str = "\
[Box info]
n control points x: 2
n control points y: 3
n control points z: 2
box length x: 45.0
box length y: 90.0
box length z: 90.0
box origin x: -20.0
box origin y: 5.0
box origin z: 0.0
rotation angle x: 20.3   # degrees
rotation angle y: 0.0
rotation angle z: 0.0

[Parameters weights]
parameter x: 1   1   0   0.2
             0   2   1   -0.1
parameter y:
  1   0   0   0.5
parameter z: 0   0   0   0.0
";

    #[test]
    fn parses_hand_written_file() {
        let params = from_prm_str(IDENTITY_PRM).unwrap();
        assert_eq!(params.n_control_points, [2, 3, 2]);
        assert_eq!(params.box_length, Vector3::new(45.0, 90.0, 90.0));
        assert_eq!(params.box_origin, Point3::new(-20.0, 5.0, 0.0));
        assert_eq!(params.rot_angle, Vector3::new(20.3, 0.0, 0.0));
        assert_eq!(params.weights_x[[1, 1, 0]], 0.2);
        assert_eq!(params.weights_x[[0, 2, 1]], -0.1);
        assert_eq!(params.weights_y[[1, 0, 0]], 0.5);
        // Everything else defaults to zero
        let nonzero: usize = Axis::ALL
            .iter()
            .map(|&a| params.weights(a).as_slice().iter().filter(|w| **w != 0.0).count())
            .sum();
        assert_eq!(nonzero, 3);
    }

    #[test]
    fn writer_lists_every_index() {
        let params = ParameterStore::new([2, 3, 2]).unwrap();
        let text = to_prm_string(&params).unwrap();
        let entries = text
            .lines()
            .filter(|l| !l.trim_start().starts_with('#'))
            .map(|l| l.split_once(':').map_or(l, |(_, rest)| rest))
            .filter(|rest| rest.split_whitespace().count() == 4)
            .count();
        assert_eq!(entries, 3 * 12);
        assert!(text.contains("parameter x: 0   0   0   0.0\n"));
        assert!(text.contains(&format!("{ENTRY_INDENT}1   2   1   0.0\n")));
    }

    #[test]
    fn roundtrip_is_exact() {
        let mut params = ParameterStore::new([3, 2, 4])
            .unwrap()
            .with_box_length(Vector3::new(0.1, 2.5e-3, 1.0 / 3.0))
            .with_box_origin(Point3::new(-1.25, 1e-12, 7.0))
            .with_rot_angle(Vector3::new(12.5, -33.3, 179.99));
        params.weights_x[[2, 1, 3]] = 0.123_456_789;
        params.weights_y[[0, 0, 0]] = -1e-7;
        params.weights_z[[1, 1, 2]] = 2.0 / 7.0;

        let text = to_prm_string(&params).unwrap();
        assert_eq!(from_prm_str(&text).unwrap(), params);
    }

    #[test]
    fn conversion_unit_is_not_persisted() {
        let params = ParameterStore::default().with_conversion_unit(1000.0);
        let back = from_prm_str(&to_prm_string(&params).unwrap()).unwrap();
        assert!((back.conversion_unit - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_section() {
        let err = from_prm_str("[Box info]\nn control points x: 2\n").unwrap_err();
        assert!(err.is_parse());
        let text = IDENTITY_PRM.replace("[Parameters weights]", "[Weights]");
        let err = from_prm_str(&text).unwrap_err();
        assert!(matches!(err, FfdError::MissingSection { ref section } if section == WEIGHTS_SECTION));
    }

    #[test]
    fn missing_key() {
        let text = IDENTITY_PRM.replace("box origin y: 5.0\n", "");
        let err = from_prm_str(&text).unwrap_err();
        assert!(matches!(err, FfdError::MissingKey { ref key, .. } if key == "box origin y"));

        let text = IDENTITY_PRM.replace("parameter z: 0   0   0   0.0\n", "");
        let err = from_prm_str(&text).unwrap_err();
        assert!(matches!(err, FfdError::MissingKey { ref key, .. } if key == "parameter z"));
    }

    #[test]
    fn non_numeric_value() {
        let text = IDENTITY_PRM.replace("box length y: 90.0", "box length y: ninety");
        let err = from_prm_str(&text).unwrap_err();
        assert!(matches!(err, FfdError::InvalidValue { ref key, .. } if key == "box length y"));

        let text = IDENTITY_PRM.replace("n control points z: 2", "n control points z: 2.5");
        assert!(from_prm_str(&text).unwrap_err().is_parse());

        let text = IDENTITY_PRM.replace("n control points z: 2", "n control points z: 0");
        assert!(from_prm_str(&text).unwrap_err().is_parse());
    }

    #[test]
    fn oversized_resolution_is_a_parse_error() {
        let text = IDENTITY_PRM
            .replace("n control points x: 2", "n control points x: 4294967296")
            .replace("n control points y: 3", "n control points y: 4294967296")
            .replace("n control points z: 2", "n control points z: 4294967296");
        let err = from_prm_str(&text).unwrap_err();
        assert!(matches!(err, FfdError::InvalidValue { ref key, .. } if key == "n control points"));
        assert!(err.is_parse());

        let text = IDENTITY_PRM.replace("n control points x: 2", "n control points x: 100000000");
        assert!(from_prm_str(&text).unwrap_err().is_parse());
    }

    #[test]
    fn out_of_bounds_index() {
        let text = IDENTITY_PRM.replace("0   2   1   -0.1", "0   3   1   -0.1");
        let err = from_prm_str(&text).unwrap_err();
        assert!(matches!(
            err,
            FfdError::IndexOutOfBounds {
                index: [0, 3, 1],
                dims: [2, 3, 2]
            }
        ));
        assert!(err.is_parse());

        let text = IDENTITY_PRM.replace("0   2   1   -0.1", "-1   2   1   -0.1");
        assert!(matches!(
            from_prm_str(&text).unwrap_err(),
            FfdError::InvalidValue { .. }
        ));
    }

    #[test]
    fn wrong_token_count() {
        let text = IDENTITY_PRM.replace("0   2   1   -0.1", "0   2   -0.1");
        let err = from_prm_str(&text).unwrap_err();
        assert!(matches!(err, FfdError::MalformedLine { line: 17, .. }));
    }

    #[test]
    fn duplicate_entries_keep_last() {
        let text = IDENTITY_PRM.replace(
            "0   2   1   -0.1",
            "0   2   1   -0.1\n             0   2   1   0.4",
        );
        let params = from_prm_str(&text).unwrap();
        assert_eq!(params.weights_x[[0, 2, 1]], 0.4);
    }

    #[test]
    fn comments_and_separators() {
        let text = IDENTITY_PRM
            .replace("box length x: 45.0", "; a comment\nBox Length X = 45.0")
            .replace("parameter y:\n", "parameter y:\n# interleaved comment\n");
        let params = from_prm_str(&text).unwrap();
        assert_eq!(params.box_length.x, 45.0);
        assert_eq!(params.weights_y[[1, 0, 0]], 0.5);
    }

    #[test]
    fn entry_before_section_rejected() {
        let err = from_prm_str("n control points x: 2\n").unwrap_err();
        assert!(matches!(err, FfdError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn write_rejects_stale_weights() {
        let mut params = ParameterStore::default();
        params.n_control_points = [3, 3, 3];
        assert!(to_prm_string(&params).unwrap_err().is_validation());
    }

    #[test]
    fn inline_comment_stripping() {
        assert_eq!(strip_inline_comment("a: 1   # note"), "a: 1   ");
        assert_eq!(strip_inline_comment("a: 1#2"), "a: 1#2");
        assert_eq!(strip_inline_comment("# full"), "");
    }
}
