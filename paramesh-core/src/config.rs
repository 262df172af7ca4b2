/// Parser for textual scene descriptions such as
/// `torus:fillwireframe; sphere(4):fill at (1.5, 0, 0) scale 0.5`
use nalgebra::Vector3;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{char, line_ending, multispace0, space0, space1, u32 as parse_u32},
    combinator::{eof, map, opt, value},
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, preceded, terminated, tuple},
    Finish, IResult,
};
use thiserror::Error;

use crate::geometry::{Dini, FillStyle, Geometry, GeometryError, Pillow, Plane, Sphere, Torus};

/// Scene shown when nothing else is configured
pub const DEFAULT_SCENE: &str = "torus:fillwireframe";

/// Errors raised while turning a description into a scene
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("scene description is empty")]
    Empty,
    #[error("invalid scene description at byte {offset}: unexpected {found:?}")]
    Parse { offset: usize, found: String },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// One model entry of a scene description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub geometry: Geometry,
    pub fill: FillStyle,
    pub translate: Vector3<f32>,
    pub scale: f32,
}

impl ModelSpec {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            fill: FillStyle::default(),
            translate: Vector3::zeros(),
            scale: 1.0,
        }
    }
}

/// Parse a whole scene description into model entries
pub fn parse_scene(input: &str) -> Result<Vec<ModelSpec>, SceneError> {
    if input.trim().is_empty() {
        return Err(SceneError::Empty);
    }

    match parse_scene_impl(input).finish() {
        Ok((_, models)) => Ok(models),
        Err(e) => {
            let offset = input.len() - e.input.len();
            let found = if e.input.is_empty() {
                "end of input".to_string()
            } else {
                e.input.chars().take(16).collect()
            };
            Err(SceneError::Parse { offset, found })
        }
    }
}

fn parse_scene_impl(input: &str) -> IResult<&str, Vec<ModelSpec>> {
    let (input, _) = multispace0(input)?;
    let (input, models) = separated_list1(separator, parse_model)(input)?;
    let (input, _) = opt(separator)(input)?;
    let (input, _) = terminated(multispace0, eof)(input)?;
    Ok((input, models))
}

fn separator(input: &str) -> IResult<&str, ()> {
    value(
        (),
        tuple((
            space0,
            alt((tag(";"), tag(","), line_ending)),
            multispace0,
        )),
    )(input)
}

fn parse_model(input: &str) -> IResult<&str, ModelSpec> {
    let (input, geometry) = parse_geometry(input)?;
    let (input, fill) = opt(preceded(tuple((space0, char(':'), space0)), parse_fill))(input)?;
    let (input, translate) = opt(preceded(
        tuple((space1, tag_no_case("at"), space0)),
        parse_vector3,
    ))(input)?;
    let (input, scale) = opt(preceded(
        tuple((space1, tag_no_case("scale"), space1)),
        float,
    ))(input)?;

    let mut spec = ModelSpec::new(geometry);
    if let Some(fill) = fill {
        spec.fill = fill;
    }
    if let Some(translate) = translate {
        spec.translate = translate;
    }
    if let Some(scale) = scale {
        spec.scale = scale;
    }
    Ok((input, spec))
}

fn parse_geometry(input: &str) -> IResult<&str, Geometry> {
    alt((
        value(Geometry::Torus(Torus::default()), tag_no_case("torus")),
        value(Geometry::Plane(Plane::default()), tag_no_case("plane")),
        value(Geometry::Pillow(Pillow::default()), tag_no_case("pillow")),
        value(Geometry::Dini(Dini::default()), tag_no_case("dini")),
        map(
            preceded(
                tag_no_case("sphere"),
                opt(delimited(
                    tuple((char('('), space0)),
                    parse_u32,
                    tuple((space0, char(')'))),
                )),
            ),
            |depth| {
                Geometry::Sphere(depth.map_or_else(Sphere::default, |depth| Sphere { depth }))
            },
        ),
    ))(input)
}

fn parse_fill(input: &str) -> IResult<&str, FillStyle> {
    alt((
        value(FillStyle::FillWireframe, tag_no_case("fillwireframe")),
        value(FillStyle::Wireframe, tag_no_case("wireframe")),
        value(FillStyle::Fill, tag_no_case("fill")),
    ))(input)
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = char('(')(input)?;
    let (input, x) = delimited(space0, float, space0)(input)?;
    let (input, _) = char(',')(input)?;
    let (input, y) = delimited(space0, float, space0)(input)?;
    let (input, _) = char(',')(input)?;
    let (input, z) = delimited(space0, float, space0)(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_scene() {
        let models = parse_scene(DEFAULT_SCENE).unwrap();
        assert_eq!(models, vec![ModelSpec::new(Geometry::Torus(Torus::default()))]);
    }

    #[test]
    fn test_full_entry() {
        let models = parse_scene("sphere(4):fill at (1.5, 0, -2) scale 0.5").unwrap();
        assert_eq!(models.len(), 1);
        let spec = models[0];
        assert_eq!(spec.geometry, Geometry::Sphere(Sphere { depth: 4 }));
        assert_eq!(spec.fill, FillStyle::Fill);
        assert_eq!(spec.translate, Vector3::new(1.5, 0.0, -2.0));
        assert_eq!(spec.scale, 0.5);
    }

    #[test]
    fn test_separators_and_defaults() {
        let models = parse_scene("\n  Torus:wireframe;plane , pillow:FILL\nsphere\n").unwrap();
        let names: Vec<_> = models.iter().map(|m| m.geometry.name()).collect();
        assert_eq!(names, vec!["torus", "plane", "pillow", "sphere"]);
        assert_eq!(models[0].fill, FillStyle::Wireframe);
        assert_eq!(models[1].fill, FillStyle::FillWireframe);
        assert_eq!(models[2].fill, FillStyle::Fill);
        assert_eq!(models[3].geometry, Geometry::Sphere(Sphere::default()));
    }

    #[test]
    fn test_dini_keyword() {
        let models = parse_scene("Dini:fill at (0, 1, 0)").unwrap();
        assert_eq!(models[0].geometry, Geometry::Dini(Dini::default()));
        assert_eq!(models[0].geometry.name(), "dini");
        assert_eq!(models[0].fill, FillStyle::Fill);
        assert_eq!(models[0].translate, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(parse_scene("  \n "), Err(SceneError::Empty));
    }

    #[test]
    fn test_unknown_geometry_reports_offset() {
        let err = parse_scene("torus; cube").unwrap_err();
        assert_eq!(
            err,
            SceneError::Parse {
                offset: 7,
                found: "cube".to_string()
            }
        );
    }

    #[test]
    fn test_bad_fill_style() {
        assert!(matches!(
            parse_scene("torus:solid"),
            Err(SceneError::Parse { offset: 5, .. })
        ));
    }
}
