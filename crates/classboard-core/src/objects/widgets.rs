//! Interactive widgets: polls, spinners and graphs.
//!
//! Their payloads travel with the object but never affect layout or containment.

use super::ObjectBase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    pub label: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

impl Poll {
    pub fn new(x: f64, y: f64, question: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            base: ObjectBase::new(x, y, 300.0, None),
            question: question.into(),
            options: labels
                .iter()
                .map(|l| PollOption { label: l.to_string(), count: 0 })
                .collect(),
        }
    }

    /// Record a vote. Returns false if the option index is out of range.
    pub fn vote(&mut self, option: usize) -> bool {
        match self.options.get_mut(option) {
            Some(opt) => {
                opt.count += 1;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spinner {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Current wheel angle in radians.
    #[serde(default)]
    pub angle: f64,
}

impl Spinner {
    pub fn new(x: f64, y: f64, labels: Vec<String>) -> Self {
        Self {
            base: ObjectBase::new(x, y, 250.0, Some(250.0)),
            labels,
            angle: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeries {
    pub label: String,
    #[serde(default)]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub series: Vec<DataSeries>,
}

impl Graph {
    pub fn new(x: f64, y: f64, title: impl Into<String>) -> Self {
        Self {
            base: ObjectBase::new(x, y, 400.0, Some(300.0)),
            title: title.into(),
            series: Vec::new(),
        }
    }
}
