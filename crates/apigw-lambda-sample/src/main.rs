use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    apigw_lambda_sample::run().await
}
