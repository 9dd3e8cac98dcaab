//! Classes, students, attendance export and leave attachments.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use campuscard_core::GatewayResult;
use campuscard_gateway::GatewayClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBrief {
    pub class_id: i64,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBrief {
    pub id: i64,
    pub name: String,
    pub class_id: i64,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub card_no: String,
    #[serde(default)]
    pub face_status: String,
}

/// Date bounds are `YYYY-MM-DD`; omitted bounds are open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceExport {
    pub class_id: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    pub name: String,
}

pub async fn classes(client: &GatewayClient) -> GatewayResult<Vec<ClassBrief>> {
    client.get("/api/v1/t/class/list", &[]).await
}

pub async fn class_students(client: &GatewayClient, class_id: i64) -> GatewayResult<Vec<StudentBrief>> {
    client
        .get("/api/v1/t/class/students", &[("classId", class_id.to_string())])
        .await
}

pub async fn student_info(client: &GatewayClient, child_id: i64) -> GatewayResult<StudentBrief> {
    client
        .get("/api/v1/t/class/student/info", &[("childId", child_id.to_string())])
        .await
}

/// CSV bytes of the class attendance sheet.
pub async fn export_class_attendance(
    client: &GatewayClient,
    export: &AttendanceExport,
) -> GatewayResult<Vec<u8>> {
    let mut query = vec![("classId", export.class_id.to_string())];
    if let Some(start) = &export.start_date {
        query.push(("startDate", start.clone()));
    }
    if let Some(end) = &export.end_date {
        query.push(("endDate", end.clone()));
    }
    client.download("/api/v1/t/attendance/export", &query).await
}

/// Upload one attachment as the multipart field `file`.
pub async fn upload_leave_attachment(
    client: &GatewayClient,
    file_name: &str,
    contents: Vec<u8>,
) -> GatewayResult<UploadedFile> {
    let part = Part::bytes(contents).file_name(file_name.to_string());
    let form = Form::new().part("file", part);
    client.post_multipart("/api/v1/leave/upload", form).await
}
