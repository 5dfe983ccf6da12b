use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        let mut lines = vec![format!("Service ({}):", base)];
        for check in ["livez", "readyz"] {
            let url = base
                .join(&format!("/_status/{}", check))
                .map_err(|e| HealthError::Failed(e.to_string()))?;
            let status = match client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => "OK".to_string(),
                Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
                Err(_) => "NOT REACHABLE".to_string(),
            };
            lines.push(format!("  {:<7} {}", format!("{}:", check), status));
        }

        Ok(lines.join("\n"))
    }
}
