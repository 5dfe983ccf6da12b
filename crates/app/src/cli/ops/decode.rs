use clap::Args;

use common::prelude::{CodecError, StepToken};
use common::shadow_url;

/// Show the download steps a shadow URL describes, without running them
#[derive(Args, Debug, Clone)]
pub struct Decode {
    /// Shadow URL to inspect
    pub url: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Decode {
    type Error = CodecError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let tokens = shadow_url::parse(&self.url)?;
        Ok(tokens
            .iter()
            .enumerate()
            .map(|(i, token)| describe(i, token))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn describe(index: usize, token: &StepToken) -> String {
    let params = token
        .params
        .iter()
        .map(|p| match std::str::from_utf8(p) {
            Ok(text) if !text.chars().any(char::is_control) => format!("{:?}", text),
            _ => format!("0x{}", hex::encode(p)),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}: {} {} [{}]", index, token.role, token.name, params)
}
