// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Leaf Scan Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-leaf-disease-detection-2025-11-02";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Leaf Scan Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
