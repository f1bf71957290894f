//! Enrollment script rendering.

pub const SCRIPT_CONTENT_TYPE: &str = "text/x-powershell; charset=utf-8";

const TEMPLATE: &str = r#"# classnet enrollment
$ErrorActionPreference = 'Stop'

$ApiBase = '{{api_base}}'
$ClassroomId = '{{classroom_id}}'
$EnrollmentToken = '{{enrollment_token}}'
$Headers = @{ Authorization = "Bearer $EnrollmentToken" }

$Stage = Join-Path $env:TEMP ('classnet-' + [guid]::NewGuid().ToString('N'))
New-Item -ItemType Directory -Path $Stage | Out-Null

$Manifest = Invoke-RestMethod -Uri "$ApiBase/api/agent/windows/bootstrap/latest.json" -Headers $Headers
foreach ($Entry in $Manifest.files) {
    $Target = Join-Path $Stage $Entry.path
    New-Item -ItemType Directory -Force -Path (Split-Path -Parent $Target) | Out-Null
    $Uri = "$ApiBase/api/agent/windows/bootstrap/file?path=" + [uri]::EscapeDataString($Entry.path)
    Invoke-WebRequest -Uri $Uri -Headers $Headers -OutFile $Target -UseBasicParsing
    $Hash = (Get-FileHash -Algorithm SHA256 -Path $Target).Hash.ToLowerInvariant()
    if ($Hash -ne $Entry.sha256) {
        throw "Integrity check failed for $($Entry.path)"
    }
}

& (Join-Path $Stage '{{installer}}') -ApiBase $ApiBase -ClassroomId $ClassroomId -EnrollmentToken $EnrollmentToken
"#;

/// Quote a value for a single-quoted PowerShell string.
fn ps_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render the script an installer runs to enroll into `classroom_id`.
///
/// `installer` is the bootstrap entry point, relative to the release root.
pub fn render_enrollment_script(
    api_base: &str,
    classroom_id: &str,
    enrollment_token: &str,
    installer: &str,
) -> String {
    TEMPLATE
        .replace("{{api_base}}", &ps_literal(api_base.trim_end_matches('/')))
        .replace("{{classroom_id}}", &ps_literal(classroom_id))
        .replace("{{enrollment_token}}", &ps_literal(enrollment_token))
        .replace("{{installer}}", &ps_literal(installer))
}
