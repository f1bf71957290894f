// --- File: crates/classnet_machines/src/doc.rs ---
#![cfg(feature = "openapi")]

use utoipa::OpenApi;

use crate::logic::{
    MachineInfo, RegisterRequest, RegisterResponse, RotateResponse, ValidateTokenRequest,
    ValidateTokenResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::validate_token_handler,
        crate::handlers::register_handler,
        crate::handlers::rotate_handler
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        MachineInfo,
        RotateResponse,
        ValidateTokenRequest,
        ValidateTokenResponse
    )),
    tags((name = "Machines", description = "Machine registration and download tokens"))
)]
pub struct MachinesApiDoc;
