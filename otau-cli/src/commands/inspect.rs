//! `otau inspect`: print the header and segment table of local images.

use std::fmt;
use std::path::{Path, PathBuf};

use otau::image::OtauImage;
use otau::validate::calculate_file_checksum;
use tracing::warn;

use crate::error::CliError;

/// Inspect each file in turn; unreadable files are reported and skipped.
pub fn run(files: &[PathBuf]) -> Result<(), CliError> {
    for (i, path) in files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match inspect(path) {
            Ok(report) => print!("{}", report),
            Err(message) => {
                warn!(path = %path.display(), "{}", message);
                println!("{}: {}", path.display(), message);
            }
        }
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<String, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    let image = OtauImage::parse(&data).map_err(|e| e.to_string())?;
    let digest = calculate_file_checksum(path).map_err(|e| e.to_string())?;
    let report = ImageReport {
        path,
        image: &image,
        file_size: data.len(),
        sha512: &digest,
    };
    Ok(report.to_string())
}

/// A parsed image rendered for display.
pub struct ImageReport<'a> {
    pub path: &'a Path,
    pub image: &'a OtauImage,
    pub file_size: usize,
    pub sha512: &'a str,
}

impl fmt::Display for ImageReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = &self.image.header;

        writeln!(f, "{}", self.path.display())?;
        writeln!(f, "  file size:          {}", self.file_size)?;
        writeln!(f, "  sha512:             {}", self.sha512)?;
        writeln!(f, "  header offset:      {}", header.offset)?;
        writeln!(f, "  header length:      {}", header.header_length)?;
        writeln!(f, "  header control:     {:#06x}", header.control.bits())?;
        match header.manufacturer_name() {
            Some(name) => writeln!(
                f,
                "  manufacturer code:  {:#06x} ({})",
                header.manufacturer_code, name
            )?,
            None => writeln!(f, "  manufacturer code:  {:#06x}", header.manufacturer_code)?,
        }
        writeln!(f, "  image type:         {:#06x}", header.image_type)?;
        writeln!(f, "  file version:       {:#010x}", header.file_version)?;
        writeln!(f, "  stack version:      {:#06x}", header.zigbee_stack_version)?;
        writeln!(f, "  header string:      {:?}", header.header_string)?;
        writeln!(f, "  image size:         {}", header.image_size)?;
        if let Some(version) = header.security_version {
            writeln!(f, "  security version:   {:#x}", version)?;
        }
        if let Some(address) = header.device_address {
            writeln!(f, "  device address:     {:#018x}", address)?;
        }
        if let Some(range) = header.hardware_versions {
            writeln!(f, "  hardware versions:  {:#06x} - {:#06x}", range.min, range.max)?;
        }

        writeln!(f, "  segments:")?;
        for segment in &self.image.segments {
            writeln!(
                f,
                "    {:#06x} {:<26} {} bytes",
                segment.tag,
                segment.description().unwrap_or("Unknown"),
                segment.length
            )?;
        }
        Ok(())
    }
}
