//! Card data records supplied by the caller.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use crate::assets::ImageRef;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRecord {
    pub full_name: String,
    /// NIM
    pub student_number: String,
    pub card_number: String,
    pub birth_place: String,
    /// `DD/MM/YYYY`
    pub birth_date: String,
    pub faculty: String,
    pub program: String,
    pub level: String,
    pub academic_year: String,
    pub validity_period: String,
    pub status: String,
    pub serial_number: String,
    pub photo: Option<ImageRef>,
    pub advisor_name: String,
    pub signature_index: u32,
    pub issue_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityRecord {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub logo: Option<ImageRef>,
}

/// Ambient inputs of a render, fixed up front so renders stay pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Year used in the synthesized QR payload.
    pub year: i32,
}

impl RenderContext {
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    pub fn from_clock() -> Self {
        Self { year: Local::now().year() }
    }
}
