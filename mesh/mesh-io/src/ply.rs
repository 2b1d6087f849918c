//! PLY (Polygon File Format) point clouds.
//!
//! Points are stored as a `vertex` element with `x`, `y`, `z` double
//! properties and no faces.
//!
//! # Format Variants
//!
//! - **ASCII** - Human-readable, larger files
//! - **Binary Little Endian** - Compact, fast to read/write
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_ply_points, save_ply_points};
//! use nalgebra::Point3;
//!
//! let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
//! save_ply_points(&points, "lattice.ply", true).unwrap();
//! let loaded = load_ply_points("lattice.ply").unwrap();
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

use crate::error::{IoError, IoResult};

/// Load the vertex positions of a PLY file.
///
/// Supports ASCII, binary little-endian, and binary big-endian formats.
/// Faces and other elements are ignored.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file is not valid PLY format
pub fn load_ply_points<P: AsRef<Path>>(path: P) -> IoResult<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let header = parser
        .read_header(&mut reader)
        .map_err(|e| IoError::invalid_content(format!("failed to parse PLY header: {e}")))?;
    let payload = parser
        .read_payload(&mut reader, &header)
        .map_err(|e| IoError::invalid_content(format!("failed to read PLY payload: {e}")))?;

    let points = payload
        .get("vertex")
        .map(|elements| {
            elements
                .iter()
                .map(|element| {
                    Point3::new(
                        get_float_property(element, "x").unwrap_or(0.0),
                        get_float_property(element, "y").unwrap_or(0.0),
                        get_float_property(element, "z").unwrap_or(0.0),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(points)
}

/// Extract a float property from a PLY element.
fn get_float_property(element: &DefaultElement, key: &str) -> Option<f64> {
    match element.get(key)? {
        Property::Float(v) => Some(f64::from(*v)),
        Property::Double(v) => Some(*v),
        _ => None,
    }
}

/// Save points to a PLY file.
///
/// # Arguments
///
/// * `points` - The points to save
/// * `path` - Output file path
/// * `binary` - If true, save as binary little-endian; if false, save as ASCII
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_ply_points<P: AsRef<Path>>(
    points: &[Point3<f64>],
    path: P,
    binary: bool,
) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    if binary {
        save_ply_binary(points, &mut writer)?;
    } else {
        save_ply_ascii(points, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save points as binary PLY (little-endian).
fn save_ply_binary<W: Write>(points: &[Point3<f64>], writer: &mut W) -> IoResult<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "comment Generated by CortenForge mesh-io")?;
    writeln!(writer, "element vertex {}", points.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "end_header")?;

    for p in points {
        writer.write_all(&p.x.to_le_bytes())?;
        writer.write_all(&p.y.to_le_bytes())?;
        writer.write_all(&p.z.to_le_bytes())?;
    }

    Ok(())
}

/// Save points as ASCII PLY using ply-rs.
fn save_ply_ascii<W: Write>(points: &[Point3<f64>], writer: &mut W) -> IoResult<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("Generated by CortenForge mesh-io".to_string());

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for name in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(ScalarType::Double),
        ));
    }
    vertex_def.count = points.len();
    ply.header.elements.add(vertex_def);

    let vertex_elements = points
        .iter()
        .map(|p| {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Double(p.x));
            element.insert("y".to_string(), Property::Double(p.y));
            element.insert("z".to_string(), Property::Double(p.z));
            element
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertex_elements);

    let ply_writer = Writer::new();
    ply_writer
        .write_ply(writer, &mut ply)
        .map_err(|e| IoError::invalid_content(format!("failed to write PLY: {e}")))?;

    Ok(())
}
