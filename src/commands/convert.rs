use crate::coords::{degrees_to_sexagesimal, WorldCoord};
use anyhow::Result;

pub fn convert(
    ra: Option<f64>,
    dec: Option<f64>,
    degrees: Option<f64>,
    precision: u32,
    format: &str,
) -> Result<()> {
    if let (Some(ra), Some(dec)) = (ra, dec) {
        let coord = WorldCoord::new(ra, dec)?;
        match format {
            "json" => {
                let json = serde_json::json!({
                    "ra_deg": ra,
                    "dec_deg": dec,
                    "ra": coord.format_ra(precision),
                    "dec": coord.format_dec(precision),
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            _ => {
                println!("RA:  {}", coord.format_ra(precision));
                println!("Dec: {}", coord.format_dec(precision));
            }
        }
        return Ok(());
    }

    if let Some(degrees) = degrees {
        let sex = degrees_to_sexagesimal(degrees);
        match format {
            "json" => println!("{}", serde_json::to_string_pretty(&sex)?),
            _ => println!("{}", sex.format(precision)),
        }
        return Ok(());
    }

    Err(anyhow::anyhow!(
        "Supply either --ra and --dec, or --degrees"
    ))
}
