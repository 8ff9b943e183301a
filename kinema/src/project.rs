//! Project documents: the timeline, its layers and the clips they place.
//!
//! Projects are JSON. Loading checks that every layer's keyframes are sane and that no clip
//! contains itself.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    clip::ClipLibrary,
    error::Error,
    model::{Layer, Object, ObjectId},
    resolve::resolve_frame,
};

fn default_frame_rate() -> f64 {
    24.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    pub total_frames: u32,
    pub layers: Vec<Layer>,
    #[serde(default, skip_serializing_if = "ClipLibrary::is_empty")]
    pub clips: ClipLibrary,
}

/// What one layer shows at a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLayer {
    pub name: String,
    pub objects: Vec<Object>,
}

impl Project {
    pub fn new(width: f64, height: f64, total_frames: u32) -> Self {
        Self {
            width,
            height,
            frame_rate: default_frame_rate(),
            total_frames,
            layers: vec![Layer::new("Layer 1")],
            clips: ClipLibrary::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let project: Project = serde_json::from_str(json)?;
        project.clips.validate()?;
        log::debug!(
            "Loaded {} layers, {} frames at {} fps",
            project.layers.len(),
            project.total_frames,
            project.frame_rate
        );
        Ok(project)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Visible layers at `frame`, bottom first. Looping layers wrap around the project length.
    pub fn resolve(&self, frame: u32) -> Vec<ResolvedLayer> {
        self.layers
            .iter()
            .filter(|layer| layer.visible)
            .map(|layer| ResolvedLayer {
                name: layer.name.clone(),
                objects: resolve_frame(layer, frame, Some(self.total_frames)),
            })
            .collect()
    }

    /// As [`Project::resolve`], with clip-instances replaced by their content
    pub fn resolve_expanded(&self, frame: u32, max_depth: usize) -> Result<Vec<ResolvedLayer>, Error> {
        self.resolve(frame)
            .into_iter()
            .map(|layer| {
                let objects = layer
                    .objects
                    .into_iter()
                    .map(|obj| self.clips.expand_object(obj, frame, max_depth))
                    .collect::<Result<_, _>>()?;
                Ok(ResolvedLayer {
                    name: layer.name,
                    objects,
                })
            })
            .collect()
    }

    /// The object with `id` at `frame`, searching every layer and group
    pub fn find_object(&self, frame: u32, id: &ObjectId) -> Option<Object> {
        fn find(objects: &[Object], id: &ObjectId) -> Option<Object> {
            objects.iter().find_map(|obj| {
                if &obj.id == id {
                    Some(obj.clone())
                } else {
                    find(obj.shape.children(), id)
                }
            })
        }
        self.resolve(frame)
            .iter()
            .find_map(|layer| find(&layer.objects, id))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        clip::DEFAULT_MAX_DEPTH,
        error::Error,
        model::{Attr, ObjectId, ObjectKind},
    };

    use super::Project;

    const PROJECT: &str = r##"{
        "width": 800, "height": 600, "frameRate": 12, "totalFrames": 20,
        "layers": [
            {"name": "bg", "keyframes": [
                {"frame": 1, "tween": "linear", "objects": [
                    {"id": "box", "kind": "rect", "x": 200, "y": 200, "width": 50, "height": 50}
                ]},
                {"frame": 15, "tween": "discrete", "objects": [
                    {"id": "box", "kind": "rect", "x": 800, "y": 400, "width": 50, "height": 50}
                ]}
            ]},
            {"name": "hidden", "visible": false, "keyframes": [{"frame": 1}]},
            {"name": "fg", "keyframes": [
                {"frame": 1, "objects": [
                    {"id": "g", "kind": "group", "x": 10, "y": 10, "children": [
                        {"id": "spinner", "kind": "clip-instance", "clipId": "spin"}
                    ]}
                ]}
            ]}
        ],
        "clips": {
            "spin": {"name": "Spin", "frameCount": 4, "layers": [
                {"name": "l", "keyframes": [{"frame": 1, "objects": [
                    {"id": "dot", "kind": "circle", "cx": 0, "cy": 0, "r": 2, "style": {"fill": "#ff0000"}}
                ]}]}
            ]}
        }
    }"##;

    #[test]
    fn resolves_visible_layers() {
        let project = Project::from_json(PROJECT).unwrap();
        assert_eq!(12.0, project.frame_rate);
        let layers = project.resolve(8);
        assert_eq!(
            vec!["bg", "fg"],
            layers.iter().map(|l| l.name.as_str()).collect::<Vec<_>>()
        );
        let rect = &layers[0].objects[0].shape;
        assert_eq!(Some(500.0), rect.number(Attr::X));
        assert_eq!(Some(300.0), rect.number(Attr::Y));
    }

    #[test]
    fn expands_clips() {
        let project = Project::from_json(PROJECT).unwrap();
        let layers = project.resolve_expanded(3, DEFAULT_MAX_DEPTH).unwrap();
        let group = &layers[1].objects[0];
        let spinner = &group.shape.children()[0];
        assert_eq!(ObjectKind::Group, spinner.kind());
        assert_eq!("dot", spinner.shape.children()[0].id.0);
    }

    #[test]
    fn finds_nested_objects() {
        let project = Project::from_json(PROJECT).unwrap();
        let spinner = project.find_object(1, &ObjectId::from("spinner")).unwrap();
        assert_eq!(ObjectKind::ClipInstance, spinner.kind());
        assert_eq!(None, project.find_object(1, &ObjectId::from("nope")));
    }

    #[test]
    fn rejects_self_containing_clips() {
        let json = r#"{
            "width": 10, "height": 10, "totalFrames": 1, "layers": [],
            "clips": {"a": {"name": "A", "frameCount": 1, "layers": [
                {"name": "l", "keyframes": [{"frame": 1, "objects": [
                    {"id": "i", "kind": "clip-instance", "clipId": "a"}
                ]}]}
            ]}}
        }"#;
        assert!(matches!(Project::from_json(json), Err(Error::ClipCycle(..))));
    }

    #[test]
    fn rejects_bad_keyframes() {
        let json = r#"{"width": 10, "height": 10, "totalFrames": 1,
            "layers": [{"name": "l", "keyframes": []}]}"#;
        assert!(matches!(Project::from_json(json), Err(Error::Json(..))));
    }

    #[test]
    fn save_and_load() {
        let project = Project::from_json(PROJECT).unwrap();
        let dir = std::env::temp_dir().join(format!("kinema-project-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("project.json");
        project.save(&path).unwrap();
        assert_eq!(project, Project::load(&path).unwrap());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
