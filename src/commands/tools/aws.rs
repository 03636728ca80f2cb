use super::cloud::TreeCliSpec;
use crate::commands::args::{ArgParser, FlagSpec};
use crate::policy::tree::{CommandTree, PathPolicy, command_tree};
use crate::policy::validators::{Validator, lazy_regex};

static ALLOW: CommandTree = command_tree!({
    "sts" => { "get-caller-identity" => {} },
    "s3" => { "ls" => {} },
    "s3api" => {
        "list-*" => {},
        "head-bucket" => {},
        "get-bucket-location" => {},
        "get-bucket-policy-status" => {},
        "get-bucket-versioning" => {},
        "get-bucket-tagging" => {},
        "get-public-access-block" => {},
    },
    "logs" => {
        "describe-*" => {},
        "filter-log-events" => {},
        "get-log-events" => {},
    },
    "cloudwatch" => { "describe-*" => {}, "list-*" => {}, "get-metric-statistics" => {}, "get-metric-data" => {} },
    "iam" => { "list-*" => {}, "get-role" => {}, "get-user" => {}, "get-policy" => {}, "get-policy-version" => {} },
    "configure" => { "list" => {}, "list-profiles" => {} },
    "*" => { "describe-*" => {}, "list-*" => {} },
});

static DENY: CommandTree = command_tree!({
    "sts" => {
        "get-session-token" => {},
        "get-federation-token" => {},
        "assume-role*" => {},
        "get-access-key-info" => {},
    },
    "secretsmanager" => {},
    "ssm" => {
        "get-parameter*" => {},
        "start-session" => {},
        "send-command" => {},
    },
    "kms" => { "decrypt" => {}, "generate-data-key*" => {} },
    "ecr" => { "get-login-password" => {}, "get-authorization-token" => {} },
    "eks" => { "get-token" => {} },
    "s3" => { "cp" => {}, "mv" => {}, "rm" => {}, "sync" => {}, "presign" => {} },
    "lambda" => { "invoke" => {}, "get-function" => {} },
    "ec2" => { "get-password-data" => {}, "run-instances" => {}, "terminate-instances" => {} },
    "iam" => { "create-access-key" => {} },
    "configure" => { "get" => {}, "set" => {}, "export-credentials" => {} },
    "*" => {
        "create-*" => {},
        "delete-*" => {},
        "update-*" => {},
        "put-*" => {},
        "modify-*" => {},
        "start-*" => {},
        "stop-*" => {},
        "reboot-*" => {},
    },
});

static POLICY: PathPolicy = PathPolicy {
    tool: "aws",
    allow: &ALLOW,
    deny: &DENY,
};

static REGION: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[a-z]{2}(-gov|-iso[a-z]?)?-[a-z]+-[0-9]$"),
    expected: "an AWS region such as us-east-1",
};

static PROFILE: Validator = Validator::Pattern {
    regex: lazy_regex!(r"^[A-Za-z0-9_.-]{1,64}$"),
    expected: "a profile name",
};

static OUTPUT: Validator = Validator::OneOf(&["json", "text", "table", "yaml", "yaml-stream"]);

static FLAGS: &[FlagSpec] = &[
    FlagSpec::value(&["--region"], &REGION),
    FlagSpec::value(&["--profile"], &PROFILE),
    FlagSpec::value(&["--output"], &OUTPUT),
    FlagSpec::switch(&["--no-paginate"]),
    FlagSpec::switch(&["--no-cli-pager"]),
];

/// The CLI replaces a `file://` or `fileb://` value with the file's contents.
static NO_FILE_URL: Validator = Validator::Check(|value| {
    let lower = value.to_ascii_lowercase();
    if lower.contains("file://") || lower.contains("fileb://") {
        Err("file:// and fileb:// values read local files".into())
    } else {
        Ok(())
    }
});

pub static AWS: TreeCliSpec = TreeCliSpec {
    names: &["aws"],
    policy: &POLICY,
    parser: ArgParser::pass_through("aws", FLAGS),
    forbidden: &[
        "--debug",
        "--endpoint-url",
        "--no-verify-ssl",
        "--ca-bundle",
        "--cli-input-json",
        "--cli-input-yaml",
    ],
    values: Some(&NO_FILE_URL),
    refine: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tools::cloud::testing::{assert_blocked, sanitize_with};
    use crate::error::{PolicyError, SanitizeError};

    #[test]
    fn describe_passes_unchanged() {
        assert_eq!(
            sanitize_with(&AWS, "aws ec2 describe-instances --region us-east-1").unwrap(),
            "aws ec2 describe-instances --region us-east-1"
        );
    }

    #[test]
    fn query_values_are_quoted() {
        assert_eq!(
            sanitize_with(
                &AWS,
                "aws ec2 describe-instances --query 'Reservations[].Instances[].InstanceId' --output text"
            )
            .unwrap(),
            "aws ec2 describe-instances --query 'Reservations[].Instances[].InstanceId' --output text"
        );
    }

    #[test]
    fn read_only_calls() {
        for cmd in [
            "aws sts get-caller-identity",
            "aws s3 ls s3://my-bucket/logs/",
            "aws logs filter-log-events --log-group-name /app/web --filter-pattern ERROR",
            "aws rds describe-db-instances --profile prod",
            "aws iam list-roles --no-paginate",
        ] {
            assert!(sanitize_with(&AWS, cmd).is_ok(), "{cmd}");
        }
    }

    #[test]
    fn credential_and_mutating_calls_blocked() {
        for cmd in [
            "aws sts assume-role --role-arn arn:aws:iam::1:role/x --role-session-name s",
            "aws sts get-session-token",
            "aws secretsmanager get-secret-value --secret-id db",
            "aws secretsmanager list-secrets",
            "aws ssm get-parameters-by-path --path /",
            "aws ecr get-login-password",
            "aws eks get-token --cluster-name prod",
            "aws s3 cp s3://bucket/key .",
            "aws s3 rm s3://bucket/key",
            "aws lambda invoke --function-name f out.json",
            "aws ec2 terminate-instances --instance-ids i-1",
            "aws rds delete-db-instance --db-instance-identifier db",
            "aws dynamodb put-item --table-name t --item '{}'",
            "aws kms decrypt --ciphertext-blob fileb://x",
        ] {
            assert_blocked(&AWS, cmd);
        }
    }

    #[test]
    fn unlisted_calls_not_allowed() {
        assert!(sanitize_with(&AWS, "aws ec2 import-key-pair --key-name k").is_err());
        assert!(sanitize_with(&AWS, "aws").is_err());
    }

    #[test]
    fn endpoint_override_forbidden() {
        assert!(
            sanitize_with(&AWS, "aws s3 ls --endpoint-url http://attacker.example").is_err()
        );
        assert!(sanitize_with(&AWS, "aws sts get-caller-identity --debug").is_err());
    }

    #[test]
    fn local_file_values_rejected() {
        for cmd in [
            "aws ec2 describe-instances --instance-ids file:///root/.aws/credentials",
            "aws ec2 describe-instances --filters FILEB:///root/.ssh/id_rsa",
            "aws logs describe-log-groups --cli-input-json '{}'",
            "aws logs describe-log-groups --cli-input-yaml x",
            "aws s3 ls file:///etc/passwd",
        ] {
            assert!(sanitize_with(&AWS, cmd).is_err(), "{cmd}");
        }
        match sanitize_with(&AWS, "aws ec2 describe-instances --instance-ids file:///root/.aws/credentials") {
            Err(SanitizeError::Policy(PolicyError::InvalidValue { field, .. })) => {
                assert_eq!(field, "--instance-ids")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn bad_region_rejected() {
        assert!(sanitize_with(&AWS, "aws ec2 describe-vpcs --region 'us-east-1;id'").is_err());
    }
}
